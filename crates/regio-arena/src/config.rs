//! Arena configuration parameters.

use crate::align::{is_power_of_two, DEFAULT_ALIGNMENT};
use crate::error::ArenaError;

/// Configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing buffer in bytes. Must be non-zero.
    pub capacity: usize,

    /// Alignment used by [`Arena::alloc`](crate::Arena::alloc) and
    /// [`Arena::resize`](crate::Arena::resize).
    ///
    /// Default: [`DEFAULT_ALIGNMENT`]. Must be a non-zero power of two.
    /// The backing buffer's base address is aligned to at least this value.
    pub default_align: usize,
}

impl ArenaConfig {
    /// Create a config for a buffer of `capacity` bytes with the default
    /// alignment.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            default_align: DEFAULT_ALIGNMENT,
        }
    }

    /// Override the default allocation alignment.
    pub fn with_default_align(mut self, align: usize) -> Self {
        self.default_align = align;
        self
    }

    /// Alignment of the backing buffer's base address.
    pub fn base_align(&self) -> usize {
        self.default_align.max(DEFAULT_ALIGNMENT)
    }

    /// Check the config for values an arena cannot be built from.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be non-zero".into(),
            });
        }
        if self.default_align == 0 || !is_power_of_two(self.default_align) {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "default_align must be a non-zero power of two, got {}",
                    self.default_align
                ),
            });
        }
        // Layout requires size rounded up to align to fit in isize.
        let limit = isize::MAX as usize - (self.base_align() - 1);
        if self.capacity > limit {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity {} exceeds the largest allocatable buffer ({limit} bytes)",
                    self.capacity
                ),
            });
        }
        Ok(())
    }
}
