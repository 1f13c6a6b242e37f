//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  4   | UART1 TXD       | Intercore link to the HL processor
//!  5   | UART1 RXD       | Intercore link from the HL processor
//! 20   | UART0 RXD       | Console (esp-println)
//! 21   | UART0 TXD       | Console (esp-println)

// ----- Intercore link (UART1) -----
pub const LINK_TX: u8 = 4;
pub const LINK_RX: u8 = 5;
