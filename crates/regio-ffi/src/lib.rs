//! C FFI bindings for the regio arena allocator.
//!
//! Arenas live in a process-wide handle table and are named across the C
//! boundary by opaque `u64` handles. Every entry point returns an `i32`
//! [`RegioStatus`](status::RegioStatus) and reports results through out
//! parameters. Panics never unwind into C: each entry point converts them
//! to `RegioStatus::Panicked`.
//!
//! Pointers handed out by `regio_arena_alloc*` / `regio_arena_resize*` point
//! into the arena's buffer and stay valid until the arena is reset, a
//! temporary scope opened before them ends, or the arena is freed.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `regio-arena`); here it is limited to writing through caller-provided
//! out pointers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into `RegioStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::RegioStatus::Panicked as i32, $body)
    };
}

/// Run an FFI body, returning `$fallback` if it panics.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => $fallback,
        }
    };
}

/// Lock a table mutex, returning `RegioStatus::InternalError` from the
/// enclosing body if a previous panic poisoned it.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RegioStatus::InternalError as i32,
        }
    };
}

pub mod arena;
mod handle;
pub mod stats;
pub mod status;
