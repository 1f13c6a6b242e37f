// Outbound message text: fixed prefix + 2-digit counter, 00..99 wrapping

use core::fmt::Write;

use crate::config::MESSAGE_PREFIX;
use crate::fmt::StackFmt;

pub const OUTBOUND_LEN: usize = MESSAGE_PREFIX.len() + 2;

/// On the wire the text is followed by a 0 byte, as the HL side expects.
pub const OUTBOUND_WIRE_LEN: usize = OUTBOUND_LEN + 1;

pub type OutboundText = StackFmt<OUTBOUND_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageCounter(u8);

impl MessageCounter {
    const MODULUS: u8 = 100;

    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn starting_at(value: u8) -> Self {
        Self(value % Self::MODULUS)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Current value; advances the counter.
    pub fn advance(&mut self) -> u8 {
        let v = self.0;
        self.0 = (v + 1) % Self::MODULUS;
        v
    }
}

pub fn outbound_text(counter: u8) -> OutboundText {
    let mut text = OutboundText::new();
    let _ = write!(text, "{}{:02}", MESSAGE_PREFIX, counter % MessageCounter::MODULUS);
    text
}

/// Text plus the terminating 0 byte.
pub fn outbound_wire(text: &OutboundText) -> [u8; OUTBOUND_WIRE_LEN] {
    let mut wire = [0u8; OUTBOUND_WIRE_LEN];
    let bytes = text.as_bytes();
    wire[..bytes.len()].copy_from_slice(bytes);
    wire
}
