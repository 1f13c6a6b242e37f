// intercore-rt entry point and run loop
//
// Boot sequence: logger -> clocks -> board -> link RX IRQ -> socket ->
// send timer -> run loop
// Run loop: WFI -> drain deferred work -> repeat
//
// Both ISRs do O(1) work and enqueue a fixed dispatch slot. Formatting,
// logging and transport writes only happen from the run loop.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::time::Duration;
use esp_hal::uart::{TxError, UartInterrupt};
use log::{error, info};

use core::cell::RefCell;
use critical_section::Mutex;
use static_cell::StaticCell;

use intercore_rt::apps::events::{self, EventQueue};
use intercore_rt::apps::Intercore;
use intercore_rt::board::{Board, LinkUart, SendTimer};
use intercore_rt::config::{LINK_CHANNEL, SEND_PERIOD_US};
use intercore_rt::drivers::{RxPath, SerialSocket, TxLink};
use intercore_rt::kernel;
use intercore_rt::transport::SocketHandle;

esp_bootloader_esp_idf::esp_app_desc!();

// bytes pulled out of the RX FIFO per critical section
const RX_CHUNK: usize = 16;

static DEFERRED: EventQueue = EventQueue::new();
static LINK_RX: RxPath = RxPath::new(LINK_CHANNEL);
static SOCKET: StaticCell<SerialSocket<LinkTx>> = StaticCell::new();

static SEND_TIMER: Mutex<RefCell<Option<SendTimer>>> = Mutex::new(RefCell::new(None));
static LINK: Mutex<RefCell<Option<LinkUart>>> = Mutex::new(RefCell::new(None));

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn send_timer_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = SEND_TIMER.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    events::send_timer_expired(&DEFERRED);
}

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn link_rx_handler() {
    let mut buf = [0u8; RX_CHUNK];
    loop {
        let n = critical_section::with(|cs| {
            let mut link = LINK.borrow_ref_mut(cs);
            let Some(uart) = link.as_mut() else {
                return 0;
            };
            let n = if uart.read_ready() {
                uart.read(&mut buf).unwrap_or(0)
            } else {
                0
            };
            uart.clear_interrupts(UartInterrupt::RxFifoFull.into());
            n
        });
        if n == 0 {
            break;
        }
        LINK_RX.feed(&buf[..n]);
    }
}

// receive callback handed to the socket; runs inside link_rx_handler
fn on_message(handle: SocketHandle) {
    events::message_arrived(&DEFERRED, handle);
}

#[derive(Debug)]
enum LinkError {
    NotReady,
    Uart(TxError),
}

/// TX side of the shared link UART. The RX ISR holds the same UART, so
/// each byte is written under the mask.
struct LinkTx;

impl TxLink for LinkTx {
    type Error = LinkError;

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        critical_section::with(|cs| match LINK.borrow_ref_mut(cs).as_mut() {
            Some(uart) => match uart.write(&[byte]) {
                Ok(0) => Err(nb::Error::WouldBlock),
                Ok(_) => Ok(()),
                Err(e) => Err(nb::Error::Other(LinkError::Uart(e))),
            },
            None => Err(nb::Error::Other(LinkError::NotReady)),
        })
    }

    // the FIFO drains on its own; waiting here would hold the mask
    fn flush(&mut self) -> nb::Result<(), LinkError> {
        Ok(())
    }
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("--------------------------------");
    info!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let Board {
        mut link,
        mut send_timer,
    } = Board::init(peripherals);
    info!("hardware initialized.");

    critical_section::with(|cs| {
        link.set_interrupt_handler(link_rx_handler);
        link.listen(UartInterrupt::RxFifoFull);
        LINK.borrow_ref_mut(cs).replace(link);
    });

    let socket = SerialSocket::open(LinkTx, &LINK_RX, on_message).map(|s| SOCKET.init(s));
    if socket.is_none() {
        error!("socket initialisation failed");
    }

    let armed = critical_section::with(|cs| {
        send_timer.set_interrupt_handler(send_timer_handler);
        let armed = send_timer.start(Duration::from_micros(SEND_PERIOD_US));
        send_timer.listen();
        SEND_TIMER.borrow_ref_mut(cs).replace(send_timer);
        armed
    });
    match armed {
        Ok(()) => info!("send timer: {}us", SEND_PERIOD_US),
        Err(e) => error!("send timer start failed: {:?}", e),
    }

    let mut app = Intercore::new(socket);
    info!("kernel ready.");

    kernel::run(&DEFERRED, |_, work| app.handle(work))
}
