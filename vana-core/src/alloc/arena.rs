//! First-fit arena allocator over a single fixed byte region.
//!
//! The region is tiled by in-band [`BlockHeader`]s forming a singly linked
//! chain in address order. Allocation scans the chain for the first free
//! block that fits, splitting off the remainder when it can hold another
//! header plus at least one byte. `free` marks a block free without merging
//! it with its neighbors, so fragmentation accumulates over the arena's
//! lifetime; callers size the arena for their full working set.
//!
//! The chain is shared by every caller, so the arena carries its own lock
//! covering the entire walk-and-mutate path. Payload bytes handed out by
//! `allocate` are not covered by that lock; synchronizing access to them is
//! the caller's concern.

use std::cell::UnsafeCell;
use std::mem;

use thiserror::Error;
use tracing::warn;

use crate::alloc::stats::ArenaStats;
use crate::sync::SpinLock;

/// Sentinel offset terminating the block chain and bucket lists.
pub const NIL: u32 = u32::MAX;

/// Allocation granularity; keeps every payload 8-byte aligned.
const ALIGN: usize = 8;

// The storage words must carry exactly this alignment, see `Arena::storage`.
const _: () = assert!(ALIGN == mem::size_of::<u64>() && ALIGN == mem::align_of::<u64>());

/// Arena failure conditions. Exhaustion is the only one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("no free block fits {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Header describing one contiguous span of the arena.
///
/// `size` counts payload bytes after the header; `next` is the byte offset
/// of the next header in arena order, or [`NIL`]. The chain walked from
/// offset zero exactly tiles the region: the sum of all `size` fields plus
/// header overhead equals the arena capacity, always.
#[repr(C, align(8))]
struct BlockHeader {
    size: u32,
    next: u32,
    free: bool,
}

const HEADER_SIZE: u32 = mem::size_of::<BlockHeader>() as u32;

/// Fixed-capacity first-fit allocator.
///
/// Offsets returned by [`Arena::allocate`] point at the first payload byte,
/// immediately after the block header, and stay valid until freed.
pub struct Arena {
    /// Stored as words so the base address itself carries the allocation
    /// granularity's alignment; every header and payload offset is a
    /// multiple of [`ALIGN`], so alignment holds throughout the region.
    storage: UnsafeCell<Box<[u64]>>,
    lock: SpinLock,
    stats: ArenaStats,
    capacity: u32,
}

// SAFETY: Every access to the block chain happens under `self.lock`;
// payload bytes are owned by the allocation's holder after `allocate`
// returns and before `free` is called.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Arena {
    /// Creates an arena over a fresh zeroed region of `capacity` bytes,
    /// containing a single free block spanning the whole region.
    ///
    /// # Panics
    /// If `capacity` cannot hold a header plus one aligned payload unit or
    /// does not fit offset arithmetic.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity >= HEADER_SIZE as usize + ALIGN,
            "arena capacity too small for a single block"
        );
        assert!(capacity < u32::MAX as usize, "arena capacity exceeds offset range");
        let capacity = capacity - capacity % ALIGN;

        let storage = vec![0u64; capacity / mem::size_of::<u64>()].into_boxed_slice();
        let arena = Self {
            storage: UnsafeCell::new(storage),
            lock: SpinLock::new(),
            stats: ArenaStats::new(),
            capacity: capacity as u32,
        };

        // SAFETY: offset 0 is in bounds and aligned; nothing else references
        // the region yet.
        unsafe {
            let head = arena.header_ptr(0);
            (*head).size = arena.capacity - HEADER_SIZE;
            (*head).free = true;
            (*head).next = NIL;
        }
        arena
    }

    /// First-fit allocation of `size` bytes (rounded up to the allocation
    /// granularity). Returns the payload offset.
    pub fn allocate(&self, size: usize) -> Result<u32, AllocError> {
        let request = round_up(size.max(1)) as u32;
        let _guard = self.lock.lock();

        let mut offset = 0u32;
        loop {
            let header = self.header_ptr(offset);
            // SAFETY: `offset` only ever takes values written into the chain
            // by this arena, all of which point at live headers in bounds.
            unsafe {
                if (*header).free && (*header).size >= request {
                    (*header).free = false;

                    let remainder = (*header).size - request;
                    if remainder > HEADER_SIZE {
                        // Split: the tail becomes a new free block right
                        // after the allocated payload.
                        let split_offset = offset + HEADER_SIZE + request;
                        let split = self.header_ptr(split_offset);
                        (*split).size = remainder - HEADER_SIZE;
                        (*split).free = true;
                        (*split).next = (*header).next;
                        (*header).next = split_offset;
                        (*header).size = request;
                    }

                    self.stats.record_allocation((*header).size as usize);
                    return Ok(offset + HEADER_SIZE);
                }

                if (*header).next == NIL {
                    break;
                }
                offset = (*header).next;
            }
        }

        self.stats.record_failure();
        warn!(requested = size, "arena exhausted");
        Err(AllocError::OutOfMemory { requested: size })
    }

    /// Marks the block owning `data_offset` free. Adjacent free blocks are
    /// not merged and the offset is not validated.
    ///
    /// # Precondition
    /// `data_offset` must be an offset previously returned by
    /// [`Arena::allocate`] on this arena and not yet freed; anything else
    /// corrupts the block chain.
    pub fn free(&self, data_offset: u32) {
        let _guard = self.lock.lock();
        let header = self.header_ptr(data_offset - HEADER_SIZE);
        // SAFETY: per the precondition the header precedes a live payload.
        unsafe {
            (*header).free = true;
            self.stats.record_free((*header).size as usize);
        }
    }

    /// Raw pointer to the payload at `data_offset`.
    ///
    /// The pointee is owned by whoever holds the allocation; the arena lock
    /// does not cover it.
    pub(crate) fn data_ptr(&self, data_offset: u32) -> *mut u8 {
        // SAFETY: offsets handed out by `allocate` are in bounds.
        unsafe { self.base_ptr().add(data_offset as usize) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Sum over the chain of `size + header` per block. Equals
    /// [`Arena::capacity`] whenever the chain is intact; tests lean on this.
    pub fn accounted_bytes(&self) -> usize {
        let _guard = self.lock.lock();
        self.walk(|_, _| {})
    }

    /// Payload bytes currently sitting in free blocks.
    pub fn free_bytes(&self) -> usize {
        let _guard = self.lock.lock();
        let mut free = 0usize;
        self.walk(|size, is_free| {
            if is_free {
                free += size;
            }
        });
        free
    }

    /// Number of blocks in the chain (free and used).
    pub fn block_count(&self) -> usize {
        let _guard = self.lock.lock();
        let mut count = 0usize;
        self.walk(|_, _| count += 1);
        count
    }

    /// Walks the chain under the caller-held lock, feeding each block's
    /// payload size and free flag to `visit`; returns accounted bytes.
    fn walk(&self, mut visit: impl FnMut(usize, bool)) -> usize {
        let mut accounted = 0usize;
        let mut offset = 0u32;
        loop {
            let header = self.header_ptr(offset);
            // SAFETY: chain offsets point at live headers, see `allocate`.
            unsafe {
                accounted += HEADER_SIZE as usize + (*header).size as usize;
                visit((*header).size as usize, (*header).free);
                if (*header).next == NIL {
                    return accounted;
                }
                offset = (*header).next;
            }
        }
    }

    fn header_ptr(&self, offset: u32) -> *mut BlockHeader {
        // SAFETY: callers pass offsets inside the region; alignment holds
        // because the word-backed base and every offset are `ALIGN`ed.
        unsafe { self.base_ptr().add(offset as usize) as *mut BlockHeader }
    }

    fn base_ptr(&self) -> *mut u8 {
        // SAFETY: the box is never reallocated, so the base is stable.
        unsafe { (*self.storage.get()).as_mut_ptr() as *mut u8 }
    }
}

fn round_up(size: usize) -> usize {
    (size + ALIGN - 1) & !(ALIGN - 1)
}
