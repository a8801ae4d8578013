//! Fixed-capacity region ("arena") allocation.
//!
//! An [`Arena`] owns one contiguous byte buffer and hands out regions of it
//! by advancing a bump offset. Allocation is O(1), deallocation is bulk
//! only: [`Arena::reset`] releases everything, a [`TempArena`] scope or a
//! [`Checkpoint`] rewinds to an earlier point. The buffer never grows;
//! running out of room is reported as [`ArenaError::CapacityExceeded`].
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── RawBuffer          (aligned, zero-initialised backing bytes; raw.rs)
//! ├── prev_offset        (start of the most recent allocation)
//! ├── curr_offset        (next free byte)
//! └── ScopeStack         (open temp scopes / checkpoints, generation ids)
//! ```
//!
//! Callers hold [`Allocation`] handles (plain offsets) rather than borrowed
//! slices, and resolve them through [`Arena::slice`] / [`Arena::slice_mut`].
//!
//! # Safety
//!
//! The crate denies `unsafe` everywhere except `raw.rs`, which owns the
//! aligned backing allocation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod align;
pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
mod raw;
pub mod scope;

// Public re-exports for the primary API surface.
pub use align::{align_forward, checked_align_forward, is_power_of_two, DEFAULT_ALIGNMENT};
pub use arena::{Arena, ArenaState};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::Allocation;
pub use scope::{Checkpoint, TempArena};
