// Intercore message transport contract
//
// A socket is an endpoint opened once at boot with a receive callback.
// The callback fires (possibly from an ISR) when a message is waiting;
// read() then copies out the most recent one. write() queues an
// outbound message to a peer. Delivery is best effort: no acks, no
// retries, no ordering guarantee beyond what the link gives.

pub mod component_id;

pub use component_id::{COMPONENT_ID_LEN, ComponentId};

use core::fmt;

/// Result code meaning success, for peers that speak raw integers.
pub const ERROR_NONE: i32 = 0;

/// Opaque, stable token for an open socket.
///
/// Receive callbacks carry it; it never changes for the life of the
/// socket, so a deferred reader can hold onto the first one it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(u8);

impl SocketHandle {
    pub const fn new(channel: u8) -> Self {
        Self(channel)
    }
}

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket#{}", self.0)
    }
}

/// Invoked by the transport when a message has arrived.
pub type ReceiveCallback = fn(SocketHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Socket never opened, or the handle belongs to another socket
    InvalidHandle,
    /// read() with nothing waiting
    NoMessage,
    /// Waiting message is larger than the caller's buffer; it is dropped
    BufferTooSmall { needed: usize },
    /// Outbound payload exceeds the frame limit
    MessageTooLarge { len: usize },
    /// The underlying byte link refused the frame
    Link,
}

impl Error {
    /// Integer form for logs and for peers that only know codes.
    pub const fn code(self) -> i32 {
        match self {
            Error::InvalidHandle => -1,
            Error::NoMessage => -2,
            Error::BufferTooSmall { .. } => -3,
            Error::MessageTooLarge { .. } => -4,
            Error::Link => -5,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHandle => write!(f, "invalid socket handle"),
            Error::NoMessage => write!(f, "no message waiting"),
            Error::BufferTooSmall { needed } => {
                write!(f, "receive buffer too small ({} bytes needed)", needed)
            }
            Error::MessageTooLarge { len } => write!(f, "message too large ({} bytes)", len),
            Error::Link => write!(f, "link error"),
        }
    }
}

/// A message copied out by [`Socket::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound {
    pub sender: ComponentId,
    pub len: usize,
}

pub trait Socket {
    fn handle(&self) -> SocketHandle;

    /// Send `data` to `dest`. Must not block on the peer.
    fn write(&mut self, dest: &ComponentId, data: &[u8]) -> Result<(), Error>;

    /// Copy the most recently signalled message into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<Inbound, Error>;
}

impl<S: Socket + ?Sized> Socket for &mut S {
    fn handle(&self) -> SocketHandle {
        (**self).handle()
    }

    fn write(&mut self, dest: &ComponentId, data: &[u8]) -> Result<(), Error> {
        (**self).write(dest, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<Inbound, Error> {
        (**self).read(buf)
    }
}
