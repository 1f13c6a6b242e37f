// Interrupt mask: the only synchronization primitive we have
//
// On the C3, critical-section (implemented by esp-hal) raises the
// interrupt threshold for the duration of the closure and restores the
// previous level on exit, so sections nest and are safe from any ISR.
// Host builds use the std implementation (a global reentrant lock).
//
// Keep the closures O(1): index/flag updates only, never logging or I/O.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};

#[inline]
pub fn masked<R>(f: impl FnOnce(CriticalSection<'_>) -> R) -> R {
    critical_section::with(f)
}

/// State shared between interrupt and thread context.
///
/// Every access goes through [`Shared::lock`], which holds the mask for
/// exactly as long as the closure runs.
pub struct Shared<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    #[inline]
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        masked(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_sections_do_not_deadlock() {
        let shared = Shared::new(0u32);
        masked(|_| {
            shared.lock(|v| *v += 1);
            masked(|_| shared.lock(|v| *v += 1));
        });
        assert_eq!(shared.lock(|v| *v), 2);
    }
}
