//! C-compatible status codes.
//!
//! [`RegioStatus`] is a `repr(i32)` enum covering every outcome of the C
//! API. `From<&ArenaError>` maps the core's recoverable errors onto it.

use regio_arena::ArenaError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegioStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or the arena was already freed.
    InvalidHandle = -1,
    /// The request does not fit in the arena's remaining space.
    CapacityExceeded = -2,
    /// The backing buffer could not be acquired.
    AllocationFailed = -3,
    /// Capacity or default alignment rejected at construction.
    ConfigError = -4,
    /// The arena's buffer has been released.
    Freed = -5,
    /// Checkpoint already restored or discarded by a reset.
    StaleCheckpoint = -6,
    /// Checkpoint restored while inner checkpoints are still open.
    ScopeOutOfOrder = -7,
    /// The pointer passed to a resize does not lie inside the arena.
    ForeignPointer = -8,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -9,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -10,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArenaError> for RegioStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::CapacityExceeded { .. } => RegioStatus::CapacityExceeded,
            ArenaError::AllocationFailed { .. } => RegioStatus::AllocationFailed,
            ArenaError::InvalidConfig { .. } => RegioStatus::ConfigError,
            ArenaError::Freed => RegioStatus::Freed,
            ArenaError::StaleCheckpoint => RegioStatus::StaleCheckpoint,
            ArenaError::ScopeOutOfOrder { .. } => RegioStatus::ScopeOutOfOrder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(RegioStatus::Ok as i32, 0);
        assert_eq!(RegioStatus::InvalidHandle as i32, -1);
        assert_eq!(RegioStatus::CapacityExceeded as i32, -2);
        assert_eq!(RegioStatus::AllocationFailed as i32, -3);
        assert_eq!(RegioStatus::ConfigError as i32, -4);
        assert_eq!(RegioStatus::Freed as i32, -5);
        assert_eq!(RegioStatus::StaleCheckpoint as i32, -6);
        assert_eq!(RegioStatus::ScopeOutOfOrder as i32, -7);
        assert_eq!(RegioStatus::ForeignPointer as i32, -8);
        assert_eq!(RegioStatus::InvalidArgument as i32, -9);
        assert_eq!(RegioStatus::InternalError as i32, -10);
        assert_eq!(RegioStatus::Panicked as i32, -128);
    }

    #[test]
    fn arena_error_to_status() {
        assert_eq!(
            RegioStatus::from(&ArenaError::CapacityExceeded {
                requested: 8,
                remaining: 4,
            }),
            RegioStatus::CapacityExceeded
        );
        assert_eq!(
            RegioStatus::from(&ArenaError::AllocationFailed { requested: 1 }),
            RegioStatus::AllocationFailed
        );
        assert_eq!(
            RegioStatus::from(&ArenaError::InvalidConfig {
                reason: "x".into()
            }),
            RegioStatus::ConfigError
        );
        assert_eq!(RegioStatus::from(&ArenaError::Freed), RegioStatus::Freed);
        assert_eq!(
            RegioStatus::from(&ArenaError::StaleCheckpoint),
            RegioStatus::StaleCheckpoint
        );
        assert_eq!(
            RegioStatus::from(&ArenaError::ScopeOutOfOrder {
                open_depth: 2,
                checkpoint_depth: 1,
            }),
            RegioStatus::ScopeOutOfOrder
        );
    }
}
