//! ## vana-core::alloc
//! **Fixed-capacity arena with a first-fit free list**
//!
//! ### Expectations (Production):
//! - One allocation per habit record, for the lifetime of the process
//! - All block-chain access serialized by the arena's own lock
//! - Freed blocks are reusable but never coalesced; fragmentation is a
//!   documented property of the design, not a recoverable condition
//!
//! ### Key Submodules:
//! - `arena`: block-chain allocator (allocate / free / chain inspection)
//! - `stats`: atomic allocation statistics

pub mod arena;
pub mod stats;
