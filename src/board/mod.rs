//! ESP32-C3 board support
//!
//! Maps the two pieces of hardware the firmware drives, the send timer
//! and the intercore UART, to named fields so the entry point doesn't
//! need to know peripheral or GPIO numbers.

pub mod pins;

use esp_hal::{
    Blocking,
    peripherals::Peripherals,
    timer::{PeriodicTimer, timg::TimerGroup},
    uart::{self, RxConfig, Uart},
};
use log::info;

use crate::config::LINK_BAUD;

// Type Aliases
pub type LinkUart = Uart<'static, Blocking>;
pub type SendTimer = PeriodicTimer<'static, Blocking>;

/// Complete board hardware, ready for interrupt wiring.
pub struct Board {
    pub link: LinkUart,
    pub send_timer: SendTimer,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        let timg0 = TimerGroup::new(p.TIMG0);
        let send_timer = PeriodicTimer::new(timg0.timer0);

        // interrupt on every received byte; the ISR drains the FIFO
        let cfg = uart::Config::default()
            .with_baudrate(LINK_BAUD)
            .with_rx(RxConfig::default().with_fifo_full_threshold(1));
        let link = Uart::new(p.UART1, cfg)
            .unwrap()
            .with_tx(p.GPIO4) // pins::LINK_TX
            .with_rx(p.GPIO5); // pins::LINK_RX
        info!(
            "link: UART1 tx=GPIO{} rx=GPIO{} {} baud",
            pins::LINK_TX,
            pins::LINK_RX,
            LINK_BAUD
        );

        Board { link, send_timer }
    }
}
