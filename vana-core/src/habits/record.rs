//! Arena-resident habit records.
//!
//! A record is carved out of the arena by an insert, initialized in place,
//! and never individually destroyed (there is no delete operation). Its
//! identity fields (`id`, `name`, bucket link) are written once before the
//! record is published into a bucket; the entry store is mutated only under
//! the record's own lock.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::HabitError;
use crate::sync::SpinLock;
use crate::time::{DayLabel, DAY_NS};

/// Bounded name length in bytes; longer names are truncated on insert.
pub const MAX_NAME: usize = 64;

/// Fixed per-record entry capacity.
pub const MAX_ENTRIES: usize = 1024;

/// Window the completion rate is measured against, in days.
const RATE_WINDOW_DAYS: f32 = 30.0;

/// One timestamped completion event. Immutable once appended.
#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub timestamp_ns: u64,
    pub label: DayLabel,
}

/// Read-only aggregation of a record, taken under its lock in one shot.
#[derive(Clone, Debug)]
pub struct HabitStats {
    pub name: String,
    pub entry_count: u32,
    pub streak: u32,
    /// Entries as a percentage of a 30-day window; exceeds 100 for habits
    /// completed more than once a day.
    pub completion_rate: f32,
    pub last_entry: Option<String>,
}

/// A named habit with a bounded append-only entry sequence.
///
/// Lives inside the arena at the offset returned by the allocating insert;
/// `next` links records within one bucket, most recently inserted first.
#[repr(C)]
pub struct HabitRecord {
    id: u32,
    name_len: u32,
    name: [u8; MAX_NAME],
    next: u32,
    lock: SpinLock,
    entry_count: AtomicU32,
    entries: UnsafeCell<[MaybeUninit<Entry>; MAX_ENTRIES]>,
}

// SAFETY: `id`, `name` and `next` are written once before the record is
// published and never mutated; `entries` and `entry_count` are only written
// under `lock`.
unsafe impl Send for HabitRecord {}
unsafe impl Sync for HabitRecord {}

/// Initializes a record in place at `ptr`.
///
/// The entry store is left uninitialized; only the first `entry_count`
/// slots are ever read, and each is written before that count covers it.
///
/// # Safety
/// `ptr` must point at a writable, properly aligned region of at least
/// `size_of::<HabitRecord>()` bytes that no other thread is accessing.
/// `name` must have been truncated to at most [`MAX_NAME`] bytes.
pub(crate) unsafe fn init_in_place(ptr: *mut HabitRecord, id: u32, name: &str, next: u32) {
    use std::ptr::addr_of_mut;

    addr_of_mut!((*ptr).id).write(id);
    addr_of_mut!((*ptr).name_len).write(name.len() as u32);
    let name_dst = addr_of_mut!((*ptr).name) as *mut u8;
    // The arena does not zero reused blocks.
    std::ptr::write_bytes(name_dst, 0, MAX_NAME);
    std::ptr::copy_nonoverlapping(name.as_ptr(), name_dst, name.len());
    addr_of_mut!((*ptr).next).write(next);
    addr_of_mut!((*ptr).lock).write(SpinLock::new());
    addr_of_mut!((*ptr).entry_count).write(AtomicU32::new(0));
}

/// Truncates a name to the bounded length on a character boundary.
/// Applied identically on insert and lookup.
pub(crate) fn truncate_name(name: &str) -> &str {
    if name.len() <= MAX_NAME {
        return name;
    }
    let mut end = MAX_NAME;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

impl HabitRecord {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        std::str::from_utf8(&self.name[..self.name_len as usize]).unwrap_or("")
    }

    pub(crate) fn next(&self) -> u32 {
        self.next
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count.load(Ordering::Acquire)
    }

    /// Appends one completion entry under the record lock.
    pub(crate) fn append(&self, timestamp_ns: u64, label: DayLabel) -> Result<(), HabitError> {
        let _guard = self.lock.lock();

        let count = self.entry_count.load(Ordering::Relaxed) as usize;
        if count >= MAX_ENTRIES {
            return Err(HabitError::CapacityExceeded {
                name: self.name().to_owned(),
            });
        }

        // SAFETY: slot `count` is not covered by the published count yet and
        // the record lock excludes concurrent writers.
        unsafe {
            (*self.entries.get())[count].write(Entry {
                timestamp_ns,
                label,
            });
        }
        self.entry_count.store(count as u32 + 1, Ordering::Release);
        Ok(())
    }

    /// Consecutive-entry streak evaluated against `now_ns`.
    pub fn streak(&self, now_ns: u64) -> u32 {
        let _guard = self.lock.lock();
        self.streak_locked(now_ns)
    }

    /// Streak walk for callers already holding the record lock. The lock is
    /// not reentrant, so this is the only implementation; `streak` and
    /// `stats` both wrap it with a single acquisition.
    fn streak_locked(&self, now_ns: u64) -> u32 {
        let count = self.entry_count.load(Ordering::Relaxed) as usize;
        // SAFETY: lock held; slots below `count` are initialized.
        let entries = unsafe { &*self.entries.get() };

        let mut streak = 0u32;
        let mut reference = now_ns;
        for slot in entries[..count].iter().rev() {
            let entry = unsafe { slot.assume_init_ref() };
            // Literal gap rule: an entry counts while it is within one day
            // of the reference instant, which then moves onto it.
            if reference.saturating_sub(entry.timestamp_ns) <= DAY_NS {
                streak += 1;
                reference = entry.timestamp_ns;
            } else {
                break;
            }
        }
        streak
    }

    /// Snapshot of name, entry count, streak and last-entry label, taken
    /// under one lock acquisition.
    pub fn stats(&self, now_ns: u64) -> HabitStats {
        let _guard = self.lock.lock();

        let count = self.entry_count.load(Ordering::Relaxed) as usize;
        let last_entry = if count > 0 {
            // SAFETY: lock held; slots below `count` are initialized.
            let entries = unsafe { &*self.entries.get() };
            let entry = unsafe { entries[count - 1].assume_init_ref() };
            Some(entry.label.as_str().to_owned())
        } else {
            None
        };

        HabitStats {
            name: self.name().to_owned(),
            entry_count: count as u32,
            streak: self.streak_locked(now_ns),
            completion_rate: count as f32 / RATE_WINDOW_DAYS * 100.0,
            last_entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::arena::NIL;

    fn boxed_record(name: &str) -> Box<HabitRecord> {
        let slot: Box<MaybeUninit<HabitRecord>> = Box::new(MaybeUninit::uninit());
        let ptr = Box::into_raw(slot) as *mut HabitRecord;
        // SAFETY: freshly boxed, exclusively owned, properly sized region.
        unsafe {
            init_in_place(ptr, 7, truncate_name(name), NIL);
            Box::from_raw(ptr)
        }
    }

    fn label() -> DayLabel {
        DayLabel::from("01/01/2030")
    }

    #[test]
    fn initialized_fields() {
        let rec = boxed_record("Läsning");
        assert_eq!(rec.id(), 7);
        assert_eq!(rec.name(), "Läsning");
        assert_eq!(rec.entry_count(), 0);
        assert_eq!(rec.next(), NIL);
    }

    #[test]
    fn append_fills_to_capacity_then_fails() {
        let rec = boxed_record("träning");
        for i in 0..MAX_ENTRIES as u64 {
            rec.append(i, label()).unwrap();
        }
        assert_eq!(rec.entry_count(), MAX_ENTRIES as u32);
        assert!(matches!(
            rec.append(0, label()),
            Err(HabitError::CapacityExceeded { .. })
        ));
        assert_eq!(rec.entry_count(), MAX_ENTRIES as u32);
    }

    #[test]
    fn streak_walks_newest_first() {
        let rec = boxed_record("meditation");
        let hour = DAY_NS / 24;
        // Entries at t, t+1h, t+20h, t+50h.
        for offset_hours in [0, 1, 20, 50] {
            rec.append(offset_hours * hour, label()).unwrap();
        }
        // Evaluated right after the last append: the 30h gap back from the
        // newest entry breaks the run immediately after it.
        assert_eq!(rec.streak(50 * hour), 1);
    }

    #[test]
    fn streak_counts_sub_day_gaps() {
        let rec = boxed_record("löpning");
        let hour = DAY_NS / 24;
        for offset_hours in [0, 20, 40] {
            rec.append(offset_hours * hour, label()).unwrap();
        }
        assert_eq!(rec.streak(40 * hour), 3);
    }

    #[test]
    fn streak_zero_when_newest_entry_is_stale() {
        let rec = boxed_record("yoga");
        rec.append(0, label()).unwrap();
        assert_eq!(rec.streak(2 * DAY_NS), 0);
    }

    #[test]
    fn streak_accepts_future_entries() {
        // A reference instant behind the entry is a zero gap, same as the
        // original signed subtraction.
        let rec = boxed_record("sömn");
        rec.append(DAY_NS, label()).unwrap();
        assert_eq!(rec.streak(0), 1);
    }

    #[test]
    fn stats_snapshot_under_one_lock() {
        let rec = boxed_record("vana");
        assert_eq!(rec.stats(0).last_entry, None);

        rec.append(0, DayLabel::from("05/03/2026")).unwrap();
        rec.append(DAY_NS / 2, DayLabel::from("06/03/2026")).unwrap();

        let stats = rec.stats(DAY_NS / 2);
        assert_eq!(stats.name, "vana");
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.streak, 2);
        // 2 entries over a 30-day window.
        assert!((stats.completion_rate - 2.0 / 30.0 * 100.0).abs() < f32::EPSILON);
        assert_eq!(stats.last_entry.as_deref(), Some("06/03/2026"));
    }

    #[test]
    fn truncation_keeps_char_boundaries() {
        assert_eq!(truncate_name("kort"), "kort");
        let long = "x".repeat(80);
        assert_eq!(truncate_name(&long).len(), MAX_NAME);
        let multibyte = "ä".repeat(40); // 80 bytes, cut lands on a boundary
        assert_eq!(truncate_name(&multibyte), "ä".repeat(32).as_str());
        let wide = "€".repeat(30); // 90 bytes, cut lands mid-character
        assert_eq!(truncate_name(&wide), "€".repeat(21).as_str());
    }
}
