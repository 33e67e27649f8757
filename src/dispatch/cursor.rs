//! Shared claim cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Next index not yet claimed by any worker.
///
/// Every index in `[0, len)` is handed out by [`ClaimCursor::claim`] exactly
/// once, no matter how many threads call it.
#[derive(Debug)]
pub struct ClaimCursor {
    next: AtomicUsize,
    len: usize,
}

impl ClaimCursor {
    /// Cursor over `len` indices, starting at 0.
    pub fn new(len: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            len,
        }
    }

    /// Claim the next index, or `None` once every index has been handed out.
    pub fn claim(&self) -> Option<usize> {
        // Each worker overshoots at most once before stopping, so this cannot wrap.
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        (index < self.len).then_some(index)
    }

    /// Number of indices this cursor hands out.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every index has been claimed.
    pub fn is_exhausted(&self) -> bool {
        self.next.load(Ordering::SeqCst) >= self.len
    }
}
