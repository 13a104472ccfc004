//! Sharded hash index over arena-resident habit records.
//!
//! A fixed power-of-two array of buckets, each a singly linked list of
//! records guarded by its own spin lock, plus an atomic counter that hands
//! out record ids and doubles as the observable record count. The bucket is
//! selected by a full-string hash of the (truncated) name; records inside a
//! bucket are distinguished by full-name comparison, most recently inserted
//! first.
//!
//! The index owns the arena the records live in; the arena serializes its
//! own block chain, so inserts into different buckets may run concurrently.
//! Operations on different buckets are unordered relative to each other;
//! operations on one bucket, or on one record, are totally ordered by the
//! corresponding lock.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::alloc::arena::{Arena, NIL};
use crate::alloc::stats::ArenaStats;
use crate::error::HabitError;
use crate::habits::record::{self, HabitRecord, HabitStats};
use crate::time::{Calendar, Clock, SystemClock, UtcCalendar};

/// Sizing knobs for an index instance. Both are fixed at construction;
/// neither the arena nor the bucket array resizes.
#[derive(Clone, Copy, Debug)]
pub struct IndexOptions {
    /// Arena capacity in bytes. Records are never reclaimed, so this bounds
    /// the total number of inserts over the index lifetime.
    pub arena_capacity: usize,
    /// Bucket count; must be a power of two.
    pub buckets: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            arena_capacity: 8 * 1024 * 1024,
            buckets: 256,
        }
    }
}

struct Bucket {
    head: AtomicU32,
    lock: crate::sync::SpinLock,
}

/// Handle to a record located by [`HabitIndex::lookup`].
///
/// Holds no lock: the borrow stays valid after the bucket lock is released
/// because records are never freed, and concurrent appends synchronize on
/// the record's own lock.
#[derive(Clone, Copy)]
pub struct Habit<'idx> {
    record: &'idx HabitRecord,
}

impl Habit<'_> {
    pub fn id(&self) -> u32 {
        self.record.id()
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn entry_count(&self) -> u32 {
        self.record.entry_count()
    }
}

/// The habit index context object. All state lives here; independent
/// instances coexist freely.
pub struct HabitIndex {
    buckets: Box<[Bucket]>,
    mask: u64,
    count: AtomicU32,
    arena: Arena,
    clock: Arc<dyn Clock>,
    calendar: Arc<dyn Calendar>,
}

impl HabitIndex {
    /// Builds an index with the system clock and UTC calendar labels.
    pub fn new(options: IndexOptions) -> Result<Self, HabitError> {
        Self::with_deps(options, Arc::new(SystemClock), Arc::new(UtcCalendar))
    }

    /// Builds an index with injected clock and calendar, for deterministic
    /// tests and simulation.
    pub fn with_deps(
        options: IndexOptions,
        clock: Arc<dyn Clock>,
        calendar: Arc<dyn Calendar>,
    ) -> Result<Self, HabitError> {
        if !options.buckets.is_power_of_two() {
            return Err(HabitError::InvalidBucketCount(options.buckets));
        }

        let buckets = (0..options.buckets)
            .map(|_| Bucket {
                head: AtomicU32::new(NIL),
                lock: crate::sync::SpinLock::new(),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        debug!(
            buckets = options.buckets,
            arena_capacity = options.arena_capacity,
            "habit index initialized"
        );

        Ok(Self {
            buckets,
            mask: options.buckets as u64 - 1,
            count: AtomicU32::new(0),
            arena: Arena::with_capacity(options.arena_capacity),
            clock,
            calendar,
        })
    }

    /// Inserts a record for `name` and returns its id.
    ///
    /// Names longer than the bound are truncated. No duplicate check is
    /// made: inserting an existing name yields a second record with a
    /// distinct id, shadowing the first for lookups.
    pub fn insert(&self, name: &str) -> Result<u32, HabitError> {
        let name = record::truncate_name(name);
        let bucket = self.bucket_for(name);
        let _guard = bucket.lock.lock();

        let offset = self.arena.allocate(mem::size_of::<HabitRecord>())?;
        let id = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        let head = bucket.head.load(Ordering::Relaxed);

        // SAFETY: `offset` addresses a freshly allocated block sized for a
        // record; the record is fully initialized before publication below.
        unsafe {
            record::init_in_place(self.arena.data_ptr(offset) as *mut HabitRecord, id, name, head);
        }
        bucket.head.store(offset, Ordering::Release);

        debug!(name, id, "habit inserted");
        Ok(id)
    }

    /// Finds the most recently inserted record named `name`.
    pub fn lookup(&self, name: &str) -> Result<Habit<'_>, HabitError> {
        let name = record::truncate_name(name);
        let bucket = self.bucket_for(name);
        let _guard = bucket.lock.lock();

        let mut offset = bucket.head.load(Ordering::Acquire);
        while offset != NIL {
            // SAFETY: bucket chains only hold offsets published by `insert`,
            // and records are never freed.
            let rec = unsafe { &*(self.arena.data_ptr(offset) as *const HabitRecord) };
            if rec.name() == name {
                return Ok(Habit { record: rec });
            }
            offset = rec.next();
        }

        Err(HabitError::NotFound {
            name: name.to_owned(),
        })
    }

    /// Appends a completion entry stamped with the injected clock's current
    /// instant and its calendar-day label.
    pub fn append_entry(&self, habit: &Habit<'_>) -> Result<(), HabitError> {
        let now = self.clock.now_ns();
        let label = self.calendar.day_label(now);
        habit.record.append(now, label)
    }

    /// Current streak for the record, evaluated from the clock's now.
    pub fn streak(&self, habit: &Habit<'_>) -> u32 {
        habit.record.streak(self.clock.now_ns())
    }

    /// Read-only stats snapshot (name, entry count, streak, last label).
    pub fn stats(&self, habit: &Habit<'_>) -> HabitStats {
        habit.record.stats(self.clock.now_ns())
    }

    /// Number of records ever inserted; also the highest assigned id.
    pub fn len(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn arena_stats(&self) -> &ArenaStats {
        self.arena.stats()
    }

    fn bucket_for(&self, name: &str) -> &Bucket {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        &self.buckets[(hasher.finish() & self.mask) as usize]
    }
}
