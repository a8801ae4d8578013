//! The fixed-capacity bump arena.
//!
//! [`Arena`] carves allocations out of one pre-acquired buffer by advancing
//! `curr_offset`. It remembers where the most recent allocation started
//! (`prev_offset`) so that allocation, and only that one, can be grown or
//! shrunk in place. Everything else is released in bulk: [`Arena::reset`]
//! rewinds to zero, temporary scopes rewind to a saved point, and
//! [`Arena::free`] gives the buffer back.
//!
//! Invariant: `prev_offset <= curr_offset <= capacity`.

use std::fmt;

use crate::align::{assert_valid_align, checked_align_forward};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::Allocation;
use crate::raw::RawBuffer;
use crate::scope::{Checkpoint, ScopeStack, TempArena};

/// Lifecycle state of an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaState {
    /// The backing buffer is held and allocations can be served.
    Ready,
    /// The backing buffer was released by [`Arena::free`]. Terminal.
    Freed,
}

/// Fixed-capacity region allocator.
///
/// Not thread-safe: every mutating operation takes `&mut self`. Use one
/// arena per thread rather than sharing one behind a lock.
///
/// # Example
///
/// ```
/// use regio_arena::Arena;
///
/// let mut arena = Arena::new(1024)?;
/// let header = arena.alloc(24)?;
/// arena.slice_mut(header).unwrap()[0] = 0x7f;
///
/// {
///     let mut scratch = arena.begin_temp();
///     let tmp = scratch.alloc(512)?;
///     assert_eq!(scratch.slice(tmp).unwrap().len(), 512);
/// } // `tmp` is released here
///
/// assert_eq!(arena.used(), 24);
/// # Ok::<(), regio_arena::ArenaError>(())
/// ```
pub struct Arena {
    /// Backing storage; `None` once freed.
    buffer: Option<RawBuffer>,
    /// Size of `buffer` in bytes (0 once freed).
    capacity: usize,
    /// Alignment used by `alloc` / `resize`.
    default_align: usize,
    /// Start of the most recent allocation.
    prev_offset: usize,
    /// Next free byte.
    curr_offset: usize,
    scopes: ScopeStack,
}

impl Arena {
    /// Create an arena with a `capacity`-byte buffer and the default
    /// alignment.
    ///
    /// Fails with [`ArenaError::AllocationFailed`] if the buffer cannot be
    /// acquired and [`ArenaError::InvalidConfig`] if `capacity` is zero or
    /// too large to lay out.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Create an arena from a config.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let buffer = RawBuffer::zeroed(config.capacity, config.base_align())?;
        Ok(Self {
            buffer: Some(buffer),
            capacity: config.capacity,
            default_align: config.default_align,
            prev_offset: 0,
            curr_offset: 0,
            scopes: ScopeStack::default(),
        })
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Release the backing buffer.
    ///
    /// Idempotent. Afterwards the arena reports [`ArenaState::Freed`],
    /// capacity zero, and every allocation or resize fails with
    /// [`ArenaError::Freed`]. Outstanding checkpoints become stale.
    pub fn free(&mut self) {
        self.buffer = None;
        self.capacity = 0;
        self.prev_offset = 0;
        self.curr_offset = 0;
        self.scopes.clear();
    }

    /// Release every allocation at once, keeping the buffer.
    ///
    /// Old bytes are not zeroed here; each new allocation zeroes its own
    /// region. Outstanding checkpoints become stale.
    pub fn reset(&mut self) {
        self.prev_offset = 0;
        self.curr_offset = 0;
        self.scopes.clear();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ArenaState {
        if self.buffer.is_some() {
            ArenaState::Ready
        } else {
            ArenaState::Freed
        }
    }

    /// Whether [`Arena::free`] has been called.
    pub fn is_freed(&self) -> bool {
        self.buffer.is_none()
    }

    // ── Allocation ──────────────────────────────────────────────

    /// Allocate `size` zeroed bytes with the arena's default alignment.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        self.alloc_align(size, self.default_align)
    }

    /// Allocate `size` zeroed bytes whose absolute address is a multiple of
    /// `align`.
    ///
    /// On [`ArenaError::CapacityExceeded`] the arena is left unchanged; it
    /// never grows. A zero-size request succeeds with an empty handle at the
    /// aligned offset.
    ///
    /// # Panics
    ///
    /// Panics if `align` is zero or not a power of two.
    pub fn alloc_align(&mut self, size: usize, align: usize) -> Result<Allocation, ArenaError> {
        assert_valid_align(align);
        let buffer = self.buffer.as_mut().ok_or(ArenaError::Freed)?;

        let exceeded = ArenaError::CapacityExceeded {
            requested: size,
            remaining: self.capacity - self.curr_offset,
        };
        // Align the absolute address, then convert back to an offset.
        let base = buffer.addr();
        let offset = match checked_align_forward(base + self.curr_offset, align) {
            Some(addr) => addr - base,
            None => return Err(exceeded),
        };
        let end = match offset.checked_add(size) {
            Some(end) if end <= self.capacity => end,
            _ => return Err(exceeded),
        };

        buffer.as_mut_slice()[offset..end].fill(0);
        self.prev_offset = offset;
        self.curr_offset = end;
        Ok(Allocation::from_raw_parts(offset, size))
    }

    /// Allocate `size` zeroed bytes and return them directly.
    ///
    /// Convenience for one-shot buffers: the returned slice borrows the
    /// arena, so no further allocation can happen while it is alive.
    pub fn alloc_bytes(&mut self, size: usize) -> Result<&mut [u8], ArenaError> {
        let allocation = self.alloc(size)?;
        self.slice_mut(allocation).ok_or(ArenaError::Freed)
    }

    // ── Resize ──────────────────────────────────────────────────

    /// Resize `old` to `new_size` bytes with the default alignment.
    ///
    /// See [`Arena::resize_align`].
    pub fn resize(
        &mut self,
        old: Option<Allocation>,
        new_size: usize,
    ) -> Result<Allocation, ArenaError> {
        self.resize_align(old, new_size, self.default_align)
    }

    /// Grow or shrink an allocation.
    ///
    /// - `None` or an empty `old`: a fresh [`Arena::alloc_align`].
    /// - `old` is the most recent allocation: resized in place. The start
    ///   offset is kept, nothing is copied, and when growing exactly the
    ///   bytes past `old.len()` are zeroed. `align` is not re-applied.
    /// - anything else: a new region is allocated and
    ///   `min(old.len(), new_size)` bytes are copied over. The old bytes
    ///   stay where they are until the next reset.
    ///
    /// On [`ArenaError::CapacityExceeded`] the arena is left unchanged. For
    /// the in-place path `remaining` counts from the start of `old`.
    ///
    /// # Panics
    ///
    /// Panics if `old` extends past the end of the buffer (it cannot have
    /// come from this arena) or if `align` is zero or not a power of two.
    pub fn resize_align(
        &mut self,
        old: Option<Allocation>,
        new_size: usize,
        align: usize,
    ) -> Result<Allocation, ArenaError> {
        assert_valid_align(align);
        let old = match old {
            Some(old) if !old.is_empty() => old,
            _ => return self.alloc_align(new_size, align),
        };
        if self.is_freed() {
            return Err(ArenaError::Freed);
        }
        let old_end = match old.end() {
            Some(end) if end <= self.capacity => end,
            _ => panic!(
                "resize target {old} is outside this arena's {} byte buffer",
                self.capacity
            ),
        };

        if old.offset() == self.prev_offset {
            let new_end = match old.offset().checked_add(new_size) {
                Some(end) if end <= self.capacity => end,
                _ => {
                    return Err(ArenaError::CapacityExceeded {
                        requested: new_size,
                        remaining: self.capacity - old.offset(),
                    })
                }
            };
            // Bytes past `curr_offset` may hold released data even when
            // `old` claims them.
            let zero_from = old_end.min(self.curr_offset);
            if new_end > zero_from {
                self.bytes_mut()[zero_from..new_end].fill(0);
            }
            self.curr_offset = new_end;
            return Ok(Allocation::from_raw_parts(old.offset(), new_size));
        }

        let new = self.alloc_align(new_size, align)?;
        let copy_len = old.len().min(new_size);
        self.bytes_mut()
            .copy_within(old.offset()..old.offset() + copy_len, new.offset());
        Ok(new)
    }

    // ── Temporary scopes ────────────────────────────────────────

    /// Open a temporary scope. See [`TempArena`].
    pub fn begin_temp(&mut self) -> TempArena<'_> {
        TempArena::new(self)
    }

    /// Save the current offsets as a new innermost scope.
    pub fn save(&mut self) -> Checkpoint {
        Checkpoint::new(self.open_scope())
    }

    /// Rewind to `checkpoint`, releasing everything allocated since.
    ///
    /// The checkpoint must be the innermost open scope. Nothing changes on
    /// error:
    /// - [`ArenaError::ScopeOutOfOrder`] if scopes saved after it are still
    ///   open (restore those first),
    /// - [`ArenaError::StaleCheckpoint`] if it was already restored, or
    ///   discarded by a reset, a free or the restore of an enclosing scope,
    /// - [`ArenaError::Freed`] if the arena has been freed.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), ArenaError> {
        if self.is_freed() {
            return Err(ArenaError::Freed);
        }
        let index = self
            .scopes
            .position(checkpoint.id())
            .ok_or(ArenaError::StaleCheckpoint)?;
        let open_depth = self.scopes.depth();
        if index + 1 != open_depth {
            return Err(ArenaError::ScopeOutOfOrder {
                open_depth,
                checkpoint_depth: index + 1,
            });
        }
        self.rewind(index);
        Ok(())
    }

    /// Number of scopes currently open.
    pub fn temp_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub(crate) fn open_scope(&mut self) -> u64 {
        self.scopes.push(self.prev_offset, self.curr_offset)
    }

    pub(crate) fn scope_position(&self, id: u64) -> Option<usize> {
        self.scopes.position(id)
    }

    /// Rewind to scope `id` if it is still open, closing any scopes opened
    /// inside it.
    pub(crate) fn close_scope(&mut self, id: u64) {
        if let Some(index) = self.scopes.position(id) {
            self.rewind(index);
        }
    }

    fn rewind(&mut self, index: usize) {
        let frame = self.scopes.unwind_to(index);
        self.prev_offset = frame.prev_offset;
        self.curr_offset = frame.curr_offset;
    }

    // ── Access ──────────────────────────────────────────────────

    /// Bytes of a live allocation.
    ///
    /// Returns `None` if the handle reaches past the live region (it was
    /// released by a reset, a rewind or an in-place shrink) or the arena
    /// has been freed.
    pub fn slice(&self, allocation: Allocation) -> Option<&[u8]> {
        let end = allocation.end()?;
        if end > self.curr_offset {
            return None;
        }
        let buffer = self.buffer.as_ref()?;
        Some(&buffer.as_slice()[allocation.offset()..end])
    }

    /// Mutable bytes of a live allocation. See [`Arena::slice`].
    pub fn slice_mut(&mut self, allocation: Allocation) -> Option<&mut [u8]> {
        let end = allocation.end()?;
        if end > self.curr_offset {
            return None;
        }
        let buffer = self.buffer.as_mut()?;
        Some(&mut buffer.as_mut_slice()[allocation.offset()..end])
    }

    /// Translate an address inside the buffer into an offset.
    ///
    /// One-past-the-end is accepted (it is where an empty allocation at the
    /// end of the buffer points). Returns `None` for any other address or
    /// when the arena is freed.
    pub fn offset_of(&self, ptr: *const u8) -> Option<usize> {
        let base = self.buffer.as_ref()?.addr();
        let addr = ptr as usize;
        if addr < base || addr - base > self.capacity {
            return None;
        }
        Some(addr - base)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self.buffer.as_mut() {
            Some(buffer) => buffer.as_mut_slice(),
            None => &mut [],
        }
    }

    // ── Stats ───────────────────────────────────────────────────

    /// Size of the backing buffer in bytes (0 once freed).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.curr_offset
    }

    /// Bytes left before the buffer is exhausted, ignoring alignment.
    pub fn remaining(&self) -> usize {
        self.capacity - self.curr_offset
    }

    /// Start offset of the most recent allocation.
    pub fn prev_offset(&self) -> usize {
        self.prev_offset
    }

    /// Alignment used by [`Arena::alloc`] and [`Arena::resize`].
    pub fn default_align(&self) -> usize {
        self.default_align
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .field("default_align", &self.default_align)
            .field("prev_offset", &self.prev_offset)
            .field("curr_offset", &self.curr_offset)
            .field("temp_depth", &self.scopes.depth())
            .finish()
    }
}
