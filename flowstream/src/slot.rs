use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot "operation in flight" guard.
///
/// A second caller does not queue: [`try_acquire`](Self::try_acquire) simply
/// returns `None` until the first guard is dropped.
#[derive(Debug, Default)]
pub struct OperationSlot {
    busy: AtomicBool,
}

impl OperationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Frees the slot when dropped, including during a panic unwind.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    slot: &'a OperationSlot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
