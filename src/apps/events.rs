// Event sources and the work they defer
//
// One dispatch slot per source. The ISR-side entry points below only
// enqueue; Intercore::handle() does the actual work after WFI.

use crate::kernel::{Dispatcher, NodeId};
use crate::transport::SocketHandle;

pub const SEND_TIMER: NodeId = NodeId::new(0);
pub const MESSAGE_ARRIVED: NodeId = NodeId::new(1);
pub const SOURCE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    SendTimer,
    MessageArrived(SocketHandle),
}

impl Deferred {
    pub const fn node(self) -> NodeId {
        match self {
            Deferred::SendTimer => SEND_TIMER,
            Deferred::MessageArrived(_) => MESSAGE_ARRIVED,
        }
    }
}

pub type EventQueue = Dispatcher<Deferred, SOURCE_COUNT>;

/// Send timer ISR: schedule the next outbound message.
#[inline]
pub fn send_timer_expired(queue: &EventQueue) {
    let _ = queue.enqueue(SEND_TIMER, Deferred::SendTimer);
}

/// Transport receive callback. The first handle seen is kept.
#[inline]
pub fn message_arrived(queue: &EventQueue, handle: SocketHandle) {
    let _ = queue.enqueue(MESSAGE_ARRIVED, Deferred::MessageArrived(handle));
}
