// Deferred dispatch and the cooperative run loop
// Single core, no preemption between callbacks. ISRs only enqueue;
// everything with unbounded latency runs from run() after WFI.

pub mod deferred;
pub mod mask;
pub mod wake;

pub use deferred::{Dispatcher, NodeId, UnknownNode};

use log::trace;

/// One drain pass: run every pending callback, including any queued
/// while the pass is in progress. Returns the number of invocations.
pub fn run_pass<W: Copy, const N: usize>(
    dispatcher: &Dispatcher<W, N>,
    handler: &mut impl FnMut(NodeId, W),
) -> usize {
    let invoked = dispatcher.drain(|id, work| handler(id, work));
    if invoked > 0 {
        trace!("drain: {} callback(s)", invoked);
    }
    invoked
}

/// Sleep until an interrupt, drain, repeat. Never returns.
pub fn run<W: Copy, const N: usize>(
    dispatcher: &Dispatcher<W, N>,
    mut handler: impl FnMut(NodeId, W),
) -> ! {
    loop {
        wake::wait_for_interrupt();
        run_pass(dispatcher, &mut handler);
    }
}
