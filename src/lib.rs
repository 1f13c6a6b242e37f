// Intercore messaging firmware for the ESP32-C3
//
// ISRs (send timer, UART link RX) only enqueue deferred work; the WFI
// run loop drains it and talks to the transport. Host builds drop the
// board module and run the unit tests against std critical sections.

#![cfg_attr(not(test), no_std)]

pub mod apps;
#[cfg(feature = "board")]
pub mod board;
pub mod config;
pub mod drivers;
pub mod fmt;
pub mod kernel;
pub mod transport;

#[cfg(test)]
mod testlog;
