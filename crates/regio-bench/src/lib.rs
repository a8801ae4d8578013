//! Benchmark profiles and utilities for the regio arena allocator.
//!
//! Provides deterministic request streams for benchmarks:
//!
//! - [`mixed_sizes_profile`]: a flat stream skewed towards small requests
//! - [`frame_profile`]: per-frame batches for reset / temp-scope workloads
//! - [`footprint`]: a capacity that fits any stream without exhaustion
//!
//! All streams are driven by a seeded ChaCha8 RNG, so the same seed always
//! produces the same requests.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regio_arena::{Arena, ArenaError};

/// A single allocation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    /// Bytes requested.
    pub size: usize,
    /// Requested alignment (a power of two).
    pub align: usize,
}

/// Draw a value in `lo..=hi`.
fn between(rng: &mut ChaCha8Rng, lo: usize, hi: usize) -> usize {
    lo + (rng.next_u64() % (hi - lo + 1) as u64) as usize
}

fn draw(rng: &mut ChaCha8Rng) -> Request {
    // 70% small, 25% medium, 5% large.
    let size = match rng.next_u64() % 100 {
        0..=69 => between(rng, 1, 64),
        70..=94 => between(rng, 65, 1024),
        _ => between(rng, 1025, 16 * 1024),
    };
    let align = 1usize << (rng.next_u64() % 7);
    Request { size, align }
}

/// `count` requests of mixed size and alignment.
///
/// Sizes range from 1 byte to 16 KiB, alignments from 1 to 64.
pub fn mixed_sizes_profile(seed: u64, count: usize) -> Vec<Request> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| draw(&mut rng)).collect()
}

/// `frames` batches of `per_frame` requests each.
///
/// Models a frame loop that allocates scratch data and throws it all away
/// at the end of every frame.
pub fn frame_profile(seed: u64, frames: usize, per_frame: usize) -> Vec<Vec<Request>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..frames)
        .map(|_| (0..per_frame).map(|_| draw(&mut rng)).collect())
        .collect()
}

/// Upper bound on the bytes `requests` can consume, padding included.
pub fn footprint(requests: &[Request]) -> usize {
    requests.iter().map(|r| r.size + r.align - 1).sum()
}

/// Serve every request in order, stopping at the first failure.
pub fn replay(arena: &mut Arena, requests: &[Request]) -> Result<usize, ArenaError> {
    for r in requests {
        arena.alloc_align(r.size, r.align)?;
    }
    Ok(arena.used())
}
