//! Low-level backing storage for the arena.
//!
//! [`RawBuffer`] is the only place in the crate that touches the system
//! allocator directly. It exists because `Vec<u8>` only guarantees 1-byte
//! alignment for its base address, while allocation offsets are computed
//! against absolute addresses and must line up with the arena's default
//! alignment from offset 0. Every `unsafe` block carries a `// SAFETY:`
//! comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::ArenaError;

/// An owned, zero-initialised, aligned byte buffer of fixed length.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBuffer {
    /// Acquire `len` zeroed bytes whose base address is a multiple of `align`.
    ///
    /// Returns `AllocationFailed` if the system allocator refuses the
    /// request, `InvalidConfig` if `len`/`align` do not form a valid layout.
    pub(crate) fn zeroed(len: usize, align: usize) -> Result<Self, ArenaError> {
        if len == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "backing buffer length must be non-zero".into(),
            });
        }
        let layout = Layout::from_size_align(len, align).map_err(|e| ArenaError::InvalidConfig {
            reason: format!("cannot lay out {len} bytes at alignment {align}: {e}"),
        })?;
        // SAFETY: `layout` has a non-zero size (checked above).
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(ArenaError::AllocationFailed { requested: len })?;
        Ok(Self { ptr, layout })
    }

    /// Length of the buffer in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Base address, for alignment arithmetic and pointer-range checks only.
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` points to `len()` initialised bytes owned by `self`
        // (alloc_zeroed initialises them) and the shared borrow of `self`
        // prevents concurrent mutation.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`; the exclusive borrow of `self` makes the
        // returned slice the only live reference into the buffer.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed(self.layout)` and is
        // deallocated exactly once, here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// SAFETY: `RawBuffer` uniquely owns its allocation and exposes it only
// through `&self` / `&mut self`, so moving it to another thread is sound.
unsafe impl Send for RawBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_buffer_is_zero() {
        let buf = RawBuffer::zeroed(256, 16).unwrap();
        assert_eq!(buf.len(), 256);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn base_address_is_aligned() {
        for align in [1, 16, 64, 4096] {
            let buf = RawBuffer::zeroed(32, align).unwrap();
            assert_eq!(buf.addr() % align, 0, "align {align}");
        }
    }

    #[test]
    fn writes_are_visible_through_shared_slice() {
        let mut buf = RawBuffer::zeroed(8, 8).unwrap();
        buf.as_mut_slice()[3] = 0xAB;
        assert_eq!(buf.as_slice()[3], 0xAB);
    }

    #[test]
    fn zero_length_rejected() {
        assert!(matches!(
            RawBuffer::zeroed(0, 8),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn invalid_layout_rejected() {
        assert!(matches!(
            RawBuffer::zeroed(16, 3),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }
}
