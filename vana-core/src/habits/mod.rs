//! ## vana-core::habits
//! **Habit records and the sharded hash index**
//!
//! ### Key Submodules:
//! - `record`: arena-resident habit record, entry append, streak and stats
//! - `index`: fixed bucket array with per-bucket locks, insert and lookup

pub mod index;
pub mod record;
