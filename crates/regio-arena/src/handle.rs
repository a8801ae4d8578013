//! Allocation handles.
//!
//! An [`Allocation`] names a byte range inside an arena's buffer. It holds
//! no reference to the arena, so the arena stays free to keep allocating
//! while callers hold any number of handles; bytes are reached through
//! [`Arena::slice`](crate::Arena::slice) and
//! [`Arena::slice_mut`](crate::Arena::slice_mut).

use std::fmt;
use std::ops::Range;

/// Location of one allocation within an arena's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    offset: usize,
    len: usize,
}

impl Allocation {
    /// Build a handle from a raw offset and length.
    ///
    /// Intended for bindings that translate pointers back into offsets.
    /// Nothing is checked here; operations that take a handle validate it
    /// against the arena they are applied to.
    pub const fn from_raw_parts(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Byte offset of the first byte, relative to the arena's base.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte, or `None` if the range overflows `usize`.
    pub const fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }

    /// The covered byte range.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` overflows.
    pub fn range(&self) -> Range<usize> {
        let end = self.end().expect("allocation range overflows usize");
        self.offset..end
    }

    /// Whether the two handles share at least one byte.
    pub fn overlaps(&self, other: &Allocation) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.range().start < other.range().end && other.range().start < self.range().end
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation(off={}, len={})", self.offset, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let a = Allocation::from_raw_parts(16, 10);
        assert_eq!(a.offset(), 16);
        assert_eq!(a.len(), 10);
        assert_eq!(a.end(), Some(26));
        assert_eq!(a.range(), 16..26);
        assert!(!a.is_empty());
    }

    #[test]
    fn overflowing_end_is_none() {
        assert_eq!(Allocation::from_raw_parts(usize::MAX, 1).end(), None);
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = Allocation::from_raw_parts(0, 10);
        let b = Allocation::from_raw_parts(10, 4);
        let c = Allocation::from_raw_parts(9, 4);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn empty_never_overlaps() {
        let a = Allocation::from_raw_parts(0, 10);
        let e = Allocation::from_raw_parts(4, 0);
        assert!(!a.overlaps(&e));
        assert!(!e.overlaps(&a));
    }

    #[test]
    fn display_format() {
        let a = Allocation::from_raw_parts(3, 7);
        assert_eq!(a.to_string(), "Allocation(off=3, len=7)");
    }
}
