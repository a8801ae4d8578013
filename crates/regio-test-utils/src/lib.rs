//! Test utilities and fixtures for regio development.
//!
//! Provides an [`AllocationLog`] that checks the placement guarantees of an
//! [`Arena`] in one call, byte-pattern helpers for verifying copies and
//! zero-fills, and scripted workloads in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use regio_arena::{Allocation, Arena};

/// Records allocations handed out by one arena and checks them together.
///
/// Feed every successful allocation to [`record`](AllocationLog::record),
/// then call [`assert_valid`](AllocationLog::assert_valid) to check that
/// all recorded regions are pairwise disjoint and inside the buffer.
/// Call [`clear`](AllocationLog::clear) whenever the arena is reset or
/// rewound, since released regions may legitimately be reused.
#[derive(Debug, Default)]
pub struct AllocationLog {
    entries: Vec<(Allocation, usize)>,
}

impl AllocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an allocation made with the given alignment.
    pub fn record(&mut self, allocation: Allocation, align: usize) {
        self.entries.push((allocation, align));
    }

    /// Forget every recorded allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allocations(&self) -> impl Iterator<Item = Allocation> + '_ {
        self.entries.iter().map(|&(a, _)| a)
    }

    /// Panic unless every recorded allocation is live, aligned, in bounds
    /// and disjoint from every other.
    pub fn assert_valid(&self, arena: &Arena) {
        for (i, &(a, align)) in self.entries.iter().enumerate() {
            let end = a.end().unwrap_or_else(|| panic!("{a} overflows"));
            assert!(
                end <= arena.capacity(),
                "{a} ends past capacity {}",
                arena.capacity()
            );
            assert_aligned(arena, a, align);
            for &(b, _) in &self.entries[i + 1..] {
                assert!(!a.overlaps(&b), "{a} overlaps {b}");
            }
        }
    }
}

/// Panic unless `allocation` starts at an address that is a multiple of
/// `align`.
pub fn assert_aligned(arena: &Arena, allocation: Allocation, align: usize) {
    let bytes = arena
        .slice(allocation)
        .unwrap_or_else(|| panic!("{allocation} is not live"));
    let addr = bytes.as_ptr() as usize;
    assert_eq!(
        addr % align,
        0,
        "{allocation} at address {addr:#x} is not {align}-aligned"
    );
}

/// Panic unless every byte of `allocation` is zero.
pub fn assert_zeroed(arena: &Arena, allocation: Allocation) {
    let bytes = arena
        .slice(allocation)
        .unwrap_or_else(|| panic!("{allocation} is not live"));
    if let Some(i) = bytes.iter().position(|&b| b != 0) {
        panic!("{allocation}: byte {i} is {:#04x}, expected zero", bytes[i]);
    }
}

/// The byte [`fill_pattern`] writes at index `i` for `seed`.
pub fn pattern_byte(seed: u8, i: usize) -> u8 {
    // Odd multiplier so consecutive bytes differ and none is forced to zero.
    seed.wrapping_add((i as u8).wrapping_mul(31)) | 1
}

/// Overwrite `allocation` with a deterministic non-zero pattern.
pub fn fill_pattern(arena: &mut Arena, allocation: Allocation, seed: u8) {
    let bytes = arena
        .slice_mut(allocation)
        .unwrap_or_else(|| panic!("{allocation} is not live"));
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = pattern_byte(seed, i);
    }
}

/// Panic unless the first `len` bytes of `allocation` hold the pattern
/// written by [`fill_pattern`] with `seed`.
pub fn assert_pattern(arena: &Arena, allocation: Allocation, seed: u8, len: usize) {
    let bytes = arena
        .slice(allocation)
        .unwrap_or_else(|| panic!("{allocation} is not live"));
    assert!(len <= bytes.len(), "{allocation} is shorter than {len}");
    for (i, &b) in bytes[..len].iter().enumerate() {
        assert_eq!(
            b,
            pattern_byte(seed, i),
            "{allocation}: byte {i} does not match pattern {seed}"
        );
    }
}
