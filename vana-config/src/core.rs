//! Core sizing parameters.
//!
//! The arena and the bucket array are fixed at construction: no resizing,
//! no record deletion. These values bound the index for its whole lifetime.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Core system configuration parameters.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CoreConfig {
    /// Arena allocator sizing.
    #[validate(nested)]
    pub arena: ArenaConfig,

    /// Hash index sizing.
    #[validate(nested)]
    pub index: IndexConfig,
}

/// Arena allocator configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ArenaConfig {
    /// Arena capacity in bytes. Records are never reclaimed, so this bounds
    /// the number of habits insertable over the process lifetime
    /// (one record is roughly 32 KiB).
    #[serde(default = "default_arena_capacity")]
    #[validate(range(min = 65536, max = 268435456))]
    pub capacity: usize,
}

fn default_arena_capacity() -> usize {
    8 * 1024 * 1024
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: default_arena_capacity(),
        }
    }
}

/// Hash index configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct IndexConfig {
    /// Bucket count (must be a power of two).
    #[serde(default = "default_buckets")]
    #[validate(range(min = 16, max = 65536))]
    #[validate(custom(function = validation::validate_power_of_two))]
    pub buckets: usize,
}

fn default_buckets() -> usize {
    256
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            buckets: default_buckets(),
        }
    }
}
