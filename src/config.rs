// Build-time configuration
//
// Everything the firmware needs to know about its peer and its timing.
// Pin assignments live in board::pins.

use crate::transport::ComponentId;

/// Baud rate of the UART link to the high-level core.
pub const LINK_BAUD: u32 = 115_200;

/// Transport channel carried on that link.
pub const LINK_CHANNEL: u8 = 0;

/// Period of the send-message timer. Faster than the link can carry a
/// frame, which is fine: pending sends coalesce.
pub const SEND_PERIOD_US: u64 = 500;

/// Largest payload a frame may carry, either direction.
pub const MAX_FRAME_PAYLOAD: usize = 64;

/// Receive buffer: longest expected message plus one byte for the
/// terminator written after it.
pub const RECV_BUF_LEN: usize = 32;

/// Outbound text is this prefix followed by a 2-digit counter.
pub const MESSAGE_PREFIX: &str = "rt-app-to-hl-app-";

/// Component id of the high-level application we talk to.
pub const HL_APP_ID: ComponentId = ComponentId::new(
    0x2502_5d2c,
    0x66da,
    0x4448,
    [0xba, 0xe1, 0xac, 0x26, 0xfc, 0xdd, 0x36, 0x27],
);
