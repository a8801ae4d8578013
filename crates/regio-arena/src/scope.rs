//! Temporary scopes: rewind the arena to an earlier offset pair.
//!
//! Two front ends share one mechanism:
//!
//! - [`TempArena`]: a guard borrowed from the arena that rewinds on drop.
//!   Nested scopes are opened through the outer guard, so the borrow
//!   checker forces innermost-first release.
//! - [`Checkpoint`]: an explicit token for callers that cannot hold a
//!   borrow across calls (e.g. the C bindings). Misordered or stale tokens
//!   are rejected with an error instead of corrupting the offsets.
//!
//! The arena keeps a stack of open frames. Every frame gets a fresh id from
//! a process-wide counter that is never reset, so a token from a discarded
//! frame, or from another arena, never matches an open frame.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::arena::Arena;

/// Source of scope frame ids, shared by every arena in the process.
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Saved offsets for one open scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScopeFrame {
    pub id: u64,
    pub prev_offset: usize,
    pub curr_offset: usize,
}

/// Stack of open scope frames, innermost last.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    frames: SmallVec<[ScopeFrame; 4]>,
}

impl ScopeStack {
    /// Open a frame over the given offsets and return its id.
    pub fn push(&mut self, prev_offset: usize, curr_offset: usize) -> u64 {
        // u64 ids cannot realistically wrap.
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        self.frames.push(ScopeFrame {
            id,
            prev_offset,
            curr_offset,
        });
        id
    }

    /// Index of the frame with the given id, if it is still open.
    pub fn position(&self, id: u64) -> Option<usize> {
        self.frames.iter().rposition(|f| f.id == id)
    }

    /// Close the frame at `index` and every frame opened after it.
    ///
    /// Returns the closed frame at `index`.
    pub fn unwind_to(&mut self, index: usize) -> ScopeFrame {
        let frame = self.frames[index];
        self.frames.truncate(index);
        frame
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Discard every open frame. Their tokens become stale.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Token returned by [`Arena::save`], consumed by [`Arena::restore`].
///
/// Neither `Clone` nor `Copy`: a checkpoint restores once.
/// Bindings that must store it as an integer use [`Checkpoint::into_raw`]
/// and [`Checkpoint::from_raw`].
#[must_use = "a checkpoint does nothing unless passed to Arena::restore"]
#[derive(Debug, PartialEq, Eq)]
pub struct Checkpoint {
    id: u64,
}

impl Checkpoint {
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Encode the checkpoint as an opaque integer.
    pub fn into_raw(self) -> u64 {
        self.id
    }

    /// Rebuild a checkpoint from [`Checkpoint::into_raw`] output.
    ///
    /// An integer that does not name an open scope of the arena it is
    /// restored into (including one issued by a different arena) is
    /// reported as [`ArenaError::StaleCheckpoint`](crate::ArenaError::StaleCheckpoint).
    pub fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checkpoint({})", self.id)
    }
}

/// A temporary scope over an [`Arena`].
///
/// Created by [`Arena::begin_temp`]. Dereferences to the arena, so
/// allocations go straight through the guard. When the guard is dropped
/// (or [`TempArena::end`] is called) the arena's offsets are restored to the
/// values they had when the scope began: every allocation made inside the
/// scope is released at once. Reclaimed bytes are not zeroed.
///
/// If the arena is reset or freed inside the scope, the scope has nothing
/// left to restore and ending it is a no-op.
#[must_use = "dropping a TempArena immediately ends the scope"]
pub struct TempArena<'a> {
    arena: &'a mut Arena,
    id: u64,
}

impl<'a> TempArena<'a> {
    pub(crate) fn new(arena: &'a mut Arena) -> Self {
        let id = arena.open_scope();
        Self { arena, id }
    }

    /// Nesting depth of this scope (1 = outermost), or `None` if the arena
    /// was reset or freed since the scope began.
    pub fn depth(&self) -> Option<usize> {
        self.arena.scope_position(self.id).map(|i| i + 1)
    }

    /// End the scope now. Equivalent to dropping the guard.
    pub fn end(self) {}
}

impl Deref for TempArena<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for TempArena<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for TempArena<'_> {
    fn drop(&mut self) {
        self.arena.close_scope(self.id);
    }
}

impl fmt::Debug for TempArena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempArena")
            .field("id", &self.id)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_increasing_ids() {
        let mut stack = ScopeStack::default();
        let a = stack.push(0, 0);
        let b = stack.push(0, 10);
        assert!(b > a);
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn unwind_closes_inner_frames() {
        let mut stack = ScopeStack::default();
        let outer = stack.push(0, 4);
        let inner = stack.push(4, 8);
        let frame = stack.unwind_to(stack.position(outer).unwrap());
        assert_eq!(frame.curr_offset, 4);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.position(inner), None);
    }

    #[test]
    fn ids_not_reused_after_clear() {
        let mut stack = ScopeStack::default();
        let a = stack.push(0, 0);
        stack.clear();
        let b = stack.push(0, 0);
        assert_ne!(a, b);
        assert_eq!(stack.position(a), None);
    }

    #[test]
    fn checkpoint_raw_round_trip() {
        let cp = Checkpoint::new(7);
        assert_eq!(Checkpoint::from_raw(cp.into_raw()), Checkpoint::new(7));
    }
}
