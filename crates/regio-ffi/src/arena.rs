//! Arena lifecycle, allocation and scope FFI.
//!
//! C callers create an arena with `regio_arena_new`, allocate through the
//! returned handle, and release it with `regio_arena_free`. Temporary
//! scopes are exposed as checkpoint tokens (`regio_temp_begin` /
//! `regio_temp_end`) since a borrowed guard cannot cross the boundary.

use std::ptr;
use std::sync::Mutex;

use regio_arena::{is_power_of_two, Allocation, Arena, ArenaConfig, Checkpoint};

use crate::handle::HandleTable;
use crate::stats::RegioArenaStats;
use crate::status::RegioStatus;

static ARENAS: Mutex<HandleTable<Arena>> = Mutex::new(HandleTable::new());

fn valid_align(align: usize) -> bool {
    align != 0 && is_power_of_two(align)
}

/// Pointer to the first byte of a live allocation.
fn allocation_ptr(arena: &mut Arena, allocation: Allocation) -> *mut u8 {
    arena
        .slice_mut(allocation)
        .map_or(ptr::null_mut(), |bytes| bytes.as_mut_ptr())
}

#[allow(unsafe_code)]
fn create(config: ArenaConfig, out: *mut u64) -> i32 {
    if out.is_null() {
        return RegioStatus::InvalidArgument as i32;
    }
    let arena = match Arena::with_config(config) {
        Ok(arena) => arena,
        Err(e) => return RegioStatus::from(&e) as i32,
    };
    let handle = ffi_lock!(ARENAS).insert(arena);
    // SAFETY: `out` is non-null and the caller guarantees it is valid for
    // writes.
    unsafe { *out = handle };
    RegioStatus::Ok as i32
}

#[allow(unsafe_code)]
fn alloc(handle: u64, size: usize, align: Option<usize>, out_ptr: *mut *mut u8) -> i32 {
    if out_ptr.is_null() {
        return RegioStatus::InvalidArgument as i32;
    }
    // SAFETY: `out_ptr` is non-null and valid for writes per caller contract.
    unsafe { *out_ptr = ptr::null_mut() };
    if align.is_some_and(|a| !valid_align(a)) {
        return RegioStatus::InvalidArgument as i32;
    }

    let mut table = ffi_lock!(ARENAS);
    let Some(arena) = table.get_mut(handle) else {
        return RegioStatus::InvalidHandle as i32;
    };
    let align = align.unwrap_or(arena.default_align());
    match arena.alloc_align(size, align) {
        Ok(allocation) => {
            let p = allocation_ptr(arena, allocation);
            // SAFETY: as above.
            unsafe { *out_ptr = p };
            RegioStatus::Ok as i32
        }
        Err(e) => RegioStatus::from(&e) as i32,
    }
}

#[allow(unsafe_code)]
fn resize(
    handle: u64,
    old_ptr: *mut u8,
    old_size: usize,
    new_size: usize,
    align: Option<usize>,
    out_ptr: *mut *mut u8,
) -> i32 {
    if out_ptr.is_null() {
        return RegioStatus::InvalidArgument as i32;
    }
    // SAFETY: `out_ptr` is non-null and valid for writes per caller contract.
    unsafe { *out_ptr = ptr::null_mut() };
    if align.is_some_and(|a| !valid_align(a)) {
        return RegioStatus::InvalidArgument as i32;
    }

    let mut table = ffi_lock!(ARENAS);
    let Some(arena) = table.get_mut(handle) else {
        return RegioStatus::InvalidHandle as i32;
    };
    let old = if old_ptr.is_null() || old_size == 0 {
        None
    } else {
        // Reject pointers the core would treat as a contract violation.
        let fits = arena
            .offset_of(old_ptr)
            .filter(|&off| off.checked_add(old_size).is_some_and(|end| end <= arena.capacity()));
        match fits {
            Some(offset) => Some(Allocation::from_raw_parts(offset, old_size)),
            None => return RegioStatus::ForeignPointer as i32,
        }
    };
    let align = align.unwrap_or(arena.default_align());
    match arena.resize_align(old, new_size, align) {
        Ok(allocation) => {
            let p = allocation_ptr(arena, allocation);
            // SAFETY: as above.
            unsafe { *out_ptr = p };
            RegioStatus::Ok as i32
        }
        Err(e) => RegioStatus::from(&e) as i32,
    }
}

// ── FFI functions ───────────────────────────────────────────────

/// Create an arena of `capacity` bytes with the default alignment.
/// Returns its handle via `out`.
///
/// A zero `capacity` is rejected with `ConfigError`; an allocator refusal
/// returns `AllocationFailed`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_new(capacity: usize, out: *mut u64) -> i32 {
    ffi_guard!({ create(ArenaConfig::new(capacity), out) })
}

/// Create an arena whose `regio_arena_alloc` / `regio_arena_resize` use
/// `default_align` (a non-zero power of two).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_new_aligned(
    capacity: usize,
    default_align: usize,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        create(
            ArenaConfig::new(capacity).with_default_align(default_align),
            out,
        )
    })
}

/// Free an arena and its buffer. Every pointer into it becomes invalid.
///
/// Freeing an already-freed handle returns `InvalidHandle` and has no
/// other effect.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_free(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(ARENAS).remove(handle) {
            Some(_) => RegioStatus::Ok as i32,
            None => RegioStatus::InvalidHandle as i32,
        }
    })
}

/// Release every allocation of an arena at once, keeping its buffer.
/// Open checkpoints are discarded.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_reset(handle: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(ARENAS);
        match table.get_mut(handle) {
            Some(arena) => {
                arena.reset();
                RegioStatus::Ok as i32
            }
            None => RegioStatus::InvalidHandle as i32,
        }
    })
}

/// Allocate `size` zeroed bytes at the arena's default alignment.
///
/// On success writes the pointer to `*out_ptr`; on any failure writes NULL
/// (when `out_ptr` itself is non-null). Exhaustion returns
/// `CapacityExceeded`; the arena never grows.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_alloc(handle: u64, size: usize, out_ptr: *mut *mut u8) -> i32 {
    ffi_guard!({ alloc(handle, size, None, out_ptr) })
}

/// Allocate `size` zeroed bytes at `align` (a non-zero power of two).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_alloc_align(
    handle: u64,
    size: usize,
    align: usize,
    out_ptr: *mut *mut u8,
) -> i32 {
    ffi_guard!({ alloc(handle, size, Some(align), out_ptr) })
}

/// Resize the `old_size`-byte block at `old_ptr` to `new_size` bytes.
///
/// The most recent allocation is resized in place; any other block is
/// copied to a fresh allocation. `old_ptr == NULL` or `old_size == 0`
/// allocates. A block that does not lie inside the arena returns
/// `ForeignPointer`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_resize(
    handle: u64,
    old_ptr: *mut u8,
    old_size: usize,
    new_size: usize,
    out_ptr: *mut *mut u8,
) -> i32 {
    ffi_guard!({ resize(handle, old_ptr, old_size, new_size, None, out_ptr) })
}

/// [`regio_arena_resize`] with an explicit alignment for the relocating
/// path.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_resize_align(
    handle: u64,
    old_ptr: *mut u8,
    old_size: usize,
    new_size: usize,
    align: usize,
    out_ptr: *mut *mut u8,
) -> i32 {
    ffi_guard!({ resize(handle, old_ptr, old_size, new_size, Some(align), out_ptr) })
}

/// Open a temporary scope. Returns a checkpoint token via `out_checkpoint`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_temp_begin(handle: u64, out_checkpoint: *mut u64) -> i32 {
    ffi_guard!({
        if out_checkpoint.is_null() {
            return RegioStatus::InvalidArgument as i32;
        }
        let mut table = ffi_lock!(ARENAS);
        let Some(arena) = table.get_mut(handle) else {
            return RegioStatus::InvalidHandle as i32;
        };
        let token = arena.save().into_raw();
        // SAFETY: `out_checkpoint` is non-null and valid for writes per
        // caller contract.
        unsafe { *out_checkpoint = token };
        RegioStatus::Ok as i32
    })
}

/// End the scope opened by `regio_temp_begin`, releasing everything
/// allocated since.
///
/// Scopes must end innermost first (`ScopeOutOfOrder` otherwise); a token
/// already ended or discarded by a reset returns `StaleCheckpoint`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_temp_end(handle: u64, checkpoint: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(ARENAS);
        let Some(arena) = table.get_mut(handle) else {
            return RegioStatus::InvalidHandle as i32;
        };
        match arena.restore(Checkpoint::from_raw(checkpoint)) {
            Ok(()) => RegioStatus::Ok as i32,
            Err(e) => RegioStatus::from(&e) as i32,
        }
    })
}

/// Copy the arena's current offsets into `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn regio_arena_stats(handle: u64, out: *mut RegioArenaStats) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RegioStatus::InvalidArgument as i32;
        }
        let table = ffi_lock!(ARENAS);
        let Some(arena) = table.get(handle) else {
            return RegioStatus::InvalidHandle as i32;
        };
        let stats = RegioArenaStats::from_arena(arena);
        // SAFETY: `out` is non-null and valid for writes per caller contract.
        unsafe { *out = stats };
        RegioStatus::Ok as i32
    })
}
