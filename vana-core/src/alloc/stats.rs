//! Atomic allocation statistics for the arena.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe counters describing arena activity.
///
/// Counters are advisory: they are updated with relaxed ordering and read
/// without synchronizing against in-flight operations.
pub struct ArenaStats {
    allocations: AtomicUsize,
    frees: AtomicUsize,
    failed_allocations: AtomicUsize,
    bytes_in_use: AtomicUsize,
}

impl ArenaStats {
    pub fn new() -> Self {
        Self {
            allocations: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            failed_allocations: AtomicUsize::new(0),
            bytes_in_use: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_allocation(&self, bytes: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_in_use.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_free(&self, bytes: usize) {
        self.frees.fetch_add(1, Ordering::Relaxed);
        self.bytes_in_use.fetch_sub(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::Relaxed)
    }

    pub fn failed_allocations(&self) -> usize {
        self.failed_allocations.load(Ordering::Relaxed)
    }

    /// Payload bytes currently held by live allocations.
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use.load(Ordering::Relaxed)
    }
}

impl Default for ArenaStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = ArenaStats::new();
        for _ in 0..5 {
            stats.record_allocation(100);
        }
        stats.record_free(100);
        stats.record_failure();

        assert_eq!(stats.allocations(), 5);
        assert_eq!(stats.frees(), 1);
        assert_eq!(stats.failed_allocations(), 1);
        assert_eq!(stats.bytes_in_use(), 400);
    }
}
