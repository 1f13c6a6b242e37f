// Intercore link framing
//
//   0x7E | len: u16 LE | component id (16) | payload (len)
//
// No checksum and no escaping: a corrupt length or a lost byte is
// recovered by hunting for the next sync byte. Frames announcing more
// than MAX_FRAME_PAYLOAD are dropped at the header.

use crate::config::MAX_FRAME_PAYLOAD;
use crate::transport::{COMPONENT_ID_LEN, ComponentId};

pub const SYNC: u8 = 0x7E;
pub const HEADER_LEN: usize = 1 + 2 + COMPONENT_ID_LEN;

pub fn encode_header(peer: &ComponentId, len: usize) -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];
    h[0] = SYNC;
    h[1..3].copy_from_slice(&(len as u16).to_le_bytes());
    h[3..].copy_from_slice(&peer.to_bytes());
    h
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub peer: ComponentId,
    len: usize,
    data: [u8; MAX_FRAME_PAYLOAD],
}

impl Frame {
    pub const EMPTY: Self = Self {
        peer: ComponentId::new(0, 0, 0, [0; 8]),
        len: 0,
        data: [0; MAX_FRAME_PAYLOAD],
    };

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Sync,
    LenLo,
    LenHi,
    Id(usize),
    Payload(usize),
}

/// Byte-at-a-time frame assembler, cheap enough to run inside the RX ISR.
pub struct FrameDecoder {
    state: State,
    id: [u8; COMPONENT_ID_LEN],
    frame: Frame,
    rejected: u32,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::Sync,
            id: [0; COMPONENT_ID_LEN],
            frame: Frame::EMPTY,
            rejected: 0,
        }
    }

    /// Feed one byte; returns the frame it completes, if any.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            State::Sync => {
                if byte == SYNC {
                    self.state = State::LenLo;
                }
            }
            State::LenLo => {
                self.frame.len = byte as usize;
                self.state = State::LenHi;
            }
            State::LenHi => {
                self.frame.len |= (byte as usize) << 8;
                if self.frame.len > MAX_FRAME_PAYLOAD {
                    self.rejected = self.rejected.wrapping_add(1);
                    self.state = State::Sync;
                } else {
                    self.state = State::Id(0);
                }
            }
            State::Id(at) => {
                self.id[at] = byte;
                if at + 1 < COMPONENT_ID_LEN {
                    self.state = State::Id(at + 1);
                } else {
                    self.frame.peer = ComponentId::from_bytes(&self.id);
                    if self.frame.len == 0 {
                        return self.finish();
                    }
                    self.state = State::Payload(0);
                }
            }
            State::Payload(at) => {
                self.frame.data[at] = byte;
                if at + 1 == self.frame.len {
                    return self.finish();
                }
                self.state = State::Payload(at + 1);
            }
        }
        None
    }

    fn finish(&mut self) -> Option<Frame> {
        self.state = State::Sync;
        Some(self.frame)
    }

    /// Frames dropped for an oversize length field.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
