//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Recoverable failures reported by [`Arena`](crate::Arena) operations.
///
/// Contract violations (a resize target outside the arena, a zero or
/// non-power-of-two alignment) are not represented here: they panic at the
/// point of detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit in the space left in the arena.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes left between the current offset and the end of the buffer.
        remaining: usize,
    },
    /// The backing buffer could not be acquired from the system allocator.
    AllocationFailed {
        /// Number of bytes requested for the backing buffer.
        requested: usize,
    },
    /// The configuration failed validation.
    InvalidConfig {
        /// Human-readable reason.
        reason: String,
    },
    /// The arena's backing buffer has been released.
    Freed,
    /// The checkpoint was invalidated by a reset, a free, or the restore of
    /// an enclosing scope.
    StaleCheckpoint,
    /// The checkpoint is still open but is not the innermost scope.
    ScopeOutOfOrder {
        /// Number of scopes currently open.
        open_depth: usize,
        /// Nesting depth of the checkpoint being restored (1 = outermost).
        checkpoint_depth: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::AllocationFailed { requested } => {
                write!(f, "failed to acquire {requested} byte arena buffer")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
            Self::Freed => write!(f, "arena has been freed"),
            Self::StaleCheckpoint => write!(f, "checkpoint is no longer open"),
            Self::ScopeOutOfOrder {
                open_depth,
                checkpoint_depth,
            } => {
                write!(
                    f,
                    "checkpoint at depth {checkpoint_depth} restored while {open_depth} scopes are open"
                )
            }
        }
    }
}

impl Error for ArenaError {}
