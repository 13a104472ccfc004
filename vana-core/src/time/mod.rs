//! ## vana-core::time
//! **Injected clock and calendar-label formatting**
//!
//! The core never reads wall-clock time directly: operations take their
//! current instant from a [`Clock`] and their day label from a [`Calendar`],
//! both supplied when the index is built. Production uses [`SystemClock`]
//! and [`UtcCalendar`]; tests drive a [`VirtualClock`] deterministically.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;

/// Nanoseconds in one day; the streak gap threshold.
pub const DAY_NS: u64 = 86_400 * 1_000_000_000;

/// Maximum formatted day-label length in bytes.
pub const MAX_LABEL: usize = 16;

/// Source of the current instant, in nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// Formats an instant into its calendar-day label.
pub trait Calendar: Send + Sync {
    fn day_label(&self, ts_ns: u64) -> DayLabel;
}

/// Wall-clock time.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock backed by an atomic counter, for deterministic
/// tests and simulation.
#[derive(Clone)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new(seed: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(seed)),
        }
    }

    pub fn advance(&self, ns: u64) {
        self.offset.fetch_add(ns, Ordering::Release);
    }
}

impl Clock for VirtualClock {
    fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }
}

/// UTC day labels in `%d/%m/%Y` form.
#[derive(Clone, Copy, Default)]
pub struct UtcCalendar;

impl Calendar for UtcCalendar {
    fn day_label(&self, ts_ns: u64) -> DayLabel {
        let date = DateTime::from_timestamp_nanos(ts_ns as i64);
        DayLabel::from(date.format("%d/%m/%Y").to_string().as_str())
    }
}

/// Fixed-width calendar-day label stored inline in an entry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DayLabel {
    buf: [u8; MAX_LABEL],
    len: u8,
}

impl DayLabel {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("")
    }
}

impl From<&str> for DayLabel {
    /// Copies at most [`MAX_LABEL`] bytes, truncating on a character
    /// boundary.
    fn from(s: &str) -> Self {
        let mut end = s.len().min(MAX_LABEL);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut buf = [0u8; MAX_LABEL];
        buf[..end].copy_from_slice(&s.as_bytes()[..end]);
        Self {
            buf,
            len: end as u8,
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayLabel({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_advances() {
        let clock = VirtualClock::new(100);
        assert_eq!(clock.now_ns(), 100);
        clock.advance(50);
        assert_eq!(clock.now_ns(), 150);

        let shared = clock.clone();
        shared.advance(50);
        assert_eq!(clock.now_ns(), 200);
    }

    #[test]
    fn utc_calendar_formats_day_month_year() {
        // 2023-06-15T12:00:00Z
        let ts_ns = 1_686_830_400u64 * 1_000_000_000;
        let label = UtcCalendar.day_label(ts_ns);
        assert_eq!(label.as_str(), "15/06/2023");
    }

    #[test]
    fn label_truncates_long_input() {
        let label = DayLabel::from("0123456789abcdefXYZ");
        assert_eq!(label.as_str(), "0123456789abcdef");
    }

    #[test]
    fn label_truncates_on_char_boundary() {
        let label = DayLabel::from("ååååååååå"); // 18 bytes
        assert_eq!(label.as_str(), "åååååååå");
    }
}
