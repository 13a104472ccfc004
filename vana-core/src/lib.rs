//! # vana-core
//!
//! Concurrent habit-record index built on two systems primitives:
//! a fixed-capacity first-fit arena allocator and a sharded hash index
//! with one spin lock per bucket.
//!
//! ### Expectations (Production):
//! - All records live inside one fixed arena region for the process lifetime
//! - Per-bucket and per-record locking, no global lock on the read/write path
//! - Deterministic behavior under an injected clock for testing
//!
//! ### Key Submodules:
//! - `sync`: busy-wait spin lock primitive
//! - `alloc`: first-fit block-chain arena and allocation statistics
//! - `time`: injected clock and calendar-label formatting
//! - `habits`: habit records, entry append, streak and stats, hash index

pub mod alloc;
pub mod error;
pub mod habits;
pub mod sync;
pub mod time;

pub mod prelude {
    pub use crate::alloc::arena::Arena;
    pub use crate::error::HabitError;
    pub use crate::habits::index::{HabitIndex, IndexOptions};
    pub use crate::habits::record::HabitStats;
    pub use crate::time::{Clock, SystemClock, VirtualClock};
}

pub use error::HabitError;
pub use habits::index::{Habit, HabitIndex, IndexOptions};
