// Deferred work queue: ISR-safe, allocation-free
//
// Each event source owns one slot in a fixed table. enqueue() links the
// slot onto an index-linked LIFO under the interrupt mask; a slot that
// is already linked is left alone, so a burst of triggers coalesces into
// a single pending run. drain() pops one slot at a time and runs the
// handler with the mask released: handlers may enqueue (themselves
// included) and the same pass picks that up before returning.
//
// The first payload stored in a slot sticks. Later enqueues reuse it.

use core::fmt;

use super::mask::Shared;

/// Index of a slot in a [`Dispatcher`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u8);

impl NodeId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownNode(pub NodeId);

impl fmt::Display for UnknownNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is outside the dispatch table", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Idle,
    Queued { next: Option<NodeId> },
}

#[derive(Debug, Clone, Copy)]
struct Slot<W> {
    link: Link,
    payload: Option<W>,
}

impl<W: Copy> Slot<W> {
    const IDLE: Self = Self {
        link: Link::Idle,
        payload: None,
    };
}

struct Queue<W, const N: usize> {
    head: Option<NodeId>,
    slots: [Slot<W>; N],
}

impl<W: Copy, const N: usize> Queue<W, N> {
    fn push(&mut self, id: NodeId, work: W) -> Result<bool, UnknownNode> {
        let head = self.head;
        let slot = self.slots.get_mut(id.index()).ok_or(UnknownNode(id))?;

        if slot.payload.is_none() {
            slot.payload = Some(work);
        }

        if let Link::Queued { .. } = slot.link {
            return Ok(false);
        }

        slot.link = Link::Queued { next: head };
        self.head = Some(id);
        Ok(true)
    }

    fn pop(&mut self) -> Option<(NodeId, W)> {
        while let Some(id) = self.head {
            let slot = &mut self.slots[id.index()];
            self.head = match slot.link {
                Link::Queued { next } => next,
                Link::Idle => None,
            };
            slot.link = Link::Idle;

            // push() stores a payload before linking, so this only skips
            // a slot that was never filled
            if let Some(work) = slot.payload {
                return Some((id, work));
            }
        }
        None
    }

    fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.link, Link::Queued { .. }))
            .count()
    }
}

/// Fixed table of callback slots plus the head of the pending chain.
///
/// `const`-constructible so it can sit in a `static` shared by ISRs and
/// the run loop. `W` is the work descriptor handed back on drain; keep it
/// small and `Copy`, it is moved in and out under the mask.
pub struct Dispatcher<W, const N: usize> {
    queue: Shared<Queue<W, N>>,
}

impl<W: Copy, const N: usize> Dispatcher<W, N> {
    pub const fn new() -> Self {
        Self {
            queue: Shared::new(Queue {
                head: None,
                slots: [Slot::IDLE; N],
            }),
        }
    }

    /// Link slot `id` with `work` as its payload.
    ///
    /// Returns `Ok(true)` if the slot was idle and is now pending,
    /// `Ok(false)` if it was already pending (the trigger coalesces).
    /// Safe from any context.
    pub fn enqueue(&self, id: NodeId, work: W) -> Result<bool, UnknownNode> {
        self.queue.lock(|q| q.push(id, work))
    }

    /// Unlink the most recently queued slot.
    pub fn pop(&self) -> Option<(NodeId, W)> {
        self.queue.lock(|q| q.pop())
    }

    /// Run `f` for every pending slot until the chain is observed empty.
    ///
    /// `f` runs outside the critical section. Returns the number of
    /// invocations in this pass.
    pub fn drain(&self, mut f: impl FnMut(NodeId, W)) -> usize {
        let mut invoked = 0;
        while let Some((id, work)) = self.pop() {
            f(id, work);
            invoked += 1;
        }
        invoked
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock(|q| q.head.is_none())
    }

    pub fn is_queued(&self, id: NodeId) -> bool {
        self.queue.lock(|q| {
            q.slots
                .get(id.index())
                .is_some_and(|s| matches!(s.link, Link::Queued { .. }))
        })
    }

    pub fn pending(&self) -> usize {
        self.queue.lock(|q| q.pending())
    }

    pub fn payload(&self, id: NodeId) -> Option<W> {
        self.queue
            .lock(|q| q.slots.get(id.index()).and_then(|s| s.payload))
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<W: Copy, const N: usize> Default for Dispatcher<W, N> {
    fn default() -> Self {
        Self::new()
    }
}
