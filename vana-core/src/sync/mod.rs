//! ## vana-core::sync
//! **Busy-wait spin lock primitive**
//!
//! A minimal test-and-set mutual exclusion lock. Waiters spin with a CPU
//! relaxation hint until the lock is observed free; acquisition order under
//! contention is unspecified and there is no timeout or cancellation.
//!
//! The lock is not reentrant: a thread that already holds the lock and
//! acquires it again deadlocks against itself. Call chains in this crate
//! therefore take a given lock exactly once (see `HabitRecord::stats`).

use std::sync::atomic::{AtomicBool, Ordering};

/// Busy-wait mutual exclusion lock.
pub struct SpinLock {
    locked: AtomicBool,
}

/// RAII guard returned by [`SpinLock::lock`]; releases on drop.
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Spins until the lock transitions from unlocked to locked.
    pub fn lock(&self) -> SpinGuard<'_> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        SpinGuard { lock: self }
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let lock = SpinLock::new();
        {
            let _g = lock.lock();
        }
        // Would deadlock if the guard had not released.
        let _g = lock.lock();
    }

    #[test]
    fn excludes_concurrent_writers() {
        let lock = SpinLock::new();
        let mut counter = 0u64;
        let counter_ptr = &mut counter as *mut u64 as usize;

        crossbeam::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| {
                    for _ in 0..10_000 {
                        let _g = lock.lock();
                        // SAFETY: Exclusive access ensured by the lock.
                        unsafe { *(counter_ptr as *mut u64) += 1 };
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(counter, 40_000);
    }
}
