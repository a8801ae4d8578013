//! Arena occupancy statistics for C callers.

use regio_arena::Arena;

/// Snapshot of an arena's offsets, copied out by `regio_arena_stats`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegioArenaStats {
    /// Size of the backing buffer in bytes.
    pub capacity: usize,
    /// Bytes consumed, including alignment padding.
    pub used: usize,
    /// Bytes left before the buffer is exhausted, ignoring alignment.
    pub remaining: usize,
    /// Start offset of the most recent allocation.
    pub prev_offset: usize,
    /// Alignment used by `regio_arena_alloc` / `regio_arena_resize`.
    pub default_align: usize,
    /// Number of open temporary scopes.
    pub temp_depth: usize,
}

impl RegioArenaStats {
    /// Read the current figures from an arena.
    pub fn from_arena(arena: &Arena) -> Self {
        Self {
            capacity: arena.capacity(),
            used: arena.used(),
            remaining: arena.remaining(),
            prev_offset: arena.prev_offset(),
            default_align: arena.default_align(),
            temp_depth: arena.temp_depth(),
        }
    }
}
