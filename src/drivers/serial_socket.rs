// Intercore socket over a UART link
//
// RX: the UART ISR hands received bytes to RxPath::feed(), which runs the
// frame decoder under the mask. A completed frame replaces whatever is
// in the mailbox (most recent wins) and the bound receive callback fires
// from the ISR with the socket handle.
//
// TX: write() frames the payload and pushes it out through a TxLink from
// thread context. Blocks only on the UART FIFO, never on the peer.

use core::fmt;

use log::{debug, info, warn};

use super::frame::{self, Frame, FrameDecoder};
use crate::config::MAX_FRAME_PAYLOAD;
use crate::kernel::mask::Shared;
use crate::transport::{ComponentId, Error, Inbound, ReceiveCallback, Socket, SocketHandle};

/// Byte sink for outbound frames.
pub trait TxLink {
    type Error: fmt::Debug;

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Inbound frames lost before a read could pick them up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drops {
    /// replaced in the mailbox by a newer frame
    pub overwritten: u32,
    /// dropped by the decoder for an oversize length
    pub rejected: u32,
}

struct RxState {
    decoder: FrameDecoder,
    mailbox: Option<Frame>,
    callback: Option<ReceiveCallback>,
    overwritten: u32,
}

/// ISR half of a socket. One per link channel, lives in a `static`.
pub struct RxPath {
    channel: u8,
    state: Shared<RxState>,
}

impl RxPath {
    pub const fn new(channel: u8) -> Self {
        Self {
            channel,
            state: Shared::new(RxState {
                decoder: FrameDecoder::new(),
                mailbox: None,
                callback: None,
                overwritten: 0,
            }),
        }
    }

    #[inline]
    pub fn handle(&self) -> SocketHandle {
        SocketHandle::new(self.channel)
    }

    /// Push received bytes through the decoder. Called from the UART ISR.
    pub fn feed(&self, bytes: &[u8]) {
        for &b in bytes {
            let notify = self.state.lock(|s| {
                let frame = s.decoder.push(b)?;
                if s.mailbox.replace(frame).is_some() {
                    s.overwritten = s.overwritten.wrapping_add(1);
                }
                s.callback
            });
            // outside the mask: the callback takes it again to enqueue
            if let Some(cb) = notify {
                cb(self.handle());
            }
        }
    }

    fn bind(&self, callback: ReceiveCallback) -> bool {
        self.state.lock(|s| {
            if s.callback.is_some() {
                return false;
            }
            s.callback = Some(callback);
            true
        })
    }

    fn take(&self) -> (Option<Frame>, Drops) {
        self.state.lock(|s| (s.mailbox.take(), s.drops()))
    }

    pub fn is_bound(&self) -> bool {
        self.state.lock(|s| s.callback.is_some())
    }

    pub fn drops(&self) -> Drops {
        self.state.lock(|s| s.drops())
    }
}

impl RxState {
    fn drops(&self) -> Drops {
        Drops {
            overwritten: self.overwritten,
            rejected: self.decoder.rejected(),
        }
    }
}

pub struct SerialSocket<T: TxLink> {
    tx: T,
    rx: &'static RxPath,
    // last drop counts written to the log
    reported: Drops,
}

impl<T: TxLink> SerialSocket<T> {
    /// Bind `on_receive` to the channel behind `rx`.
    ///
    /// Returns `None` if the channel already has a socket.
    pub fn open(tx: T, rx: &'static RxPath, on_receive: ReceiveCallback) -> Option<Self> {
        if !rx.bind(on_receive) {
            warn!("socket: {} already open", rx.handle());
            return None;
        }
        info!("socket: opened {}", rx.handle());
        Some(Self {
            tx,
            rx,
            reported: Drops::default(),
        })
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), T::Error> {
        for &b in bytes {
            nb::block!(self.tx.write_byte(b))?;
        }
        Ok(())
    }

    pub fn link(&mut self) -> &mut T {
        &mut self.tx
    }
}

impl<T: TxLink> Socket for SerialSocket<T> {
    fn handle(&self) -> SocketHandle {
        self.rx.handle()
    }

    fn write(&mut self, dest: &ComponentId, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_FRAME_PAYLOAD {
            return Err(Error::MessageTooLarge { len: data.len() });
        }

        let header = frame::encode_header(dest, data.len());
        self.send(&header)
            .and_then(|()| self.send(data))
            .and_then(|()| nb::block!(self.tx.flush()))
            .map_err(|e| {
                debug!("socket: link error {:?}", e);
                Error::Link
            })
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<Inbound, Error> {
        let (frame, drops) = self.rx.take();
        if drops != self.reported {
            debug!(
                "socket: {} rx frame(s) overwritten, {} rejected",
                drops.overwritten, drops.rejected
            );
            self.reported = drops;
        }

        let frame = frame.ok_or(Error::NoMessage)?;
        let len = frame.len();
        if len > buf.len() {
            return Err(Error::BufferTooSmall { needed: len });
        }
        buf[..len].copy_from_slice(frame.payload());
        Ok(Inbound {
            sender: frame.peer,
            len,
        })
    }
}
