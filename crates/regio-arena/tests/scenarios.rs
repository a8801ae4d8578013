//! Integration test: the reference allocation scenarios.
//!
//! Each test walks one documented sequence of allocations, scopes and
//! failures end to end and checks the arena's offsets after every step.

use regio_arena::{Allocation, Arena, ArenaConfig, ArenaError};
use regio_test_utils::{assert_pattern, assert_zeroed, fill_pattern, AllocationLog};

#[test]
fn aligned_start_unaligned_end() {
    // Capacity 64, default alignment 16: the start is aligned, the size
    // is not rounded.
    let mut arena = Arena::with_config(ArenaConfig::new(64).with_default_align(16)).unwrap();
    let a = arena.alloc(10).unwrap();
    assert_eq!(a.offset(), 0);
    assert_eq!(a.len(), 10);
    assert_eq!(arena.used(), 10);
    assert_eq!(arena.slice(a).unwrap().len(), 10);

    let b = arena.alloc(1).unwrap();
    assert_eq!(b.offset(), 16);
    assert_eq!(arena.used(), 17);
}

#[test]
fn exhaustion_leaves_offsets_untouched() {
    let mut arena = Arena::new(16).unwrap();
    arena.alloc_align(10, 1).unwrap();
    assert_eq!(arena.used(), 10);

    let err = arena.alloc_align(10, 1).unwrap_err();
    assert!(matches!(err, ArenaError::CapacityExceeded { requested: 10, .. }));
    assert_eq!(arena.used(), 10);
    assert_eq!(arena.capacity(), 16);
}

#[test]
fn temp_scope_reclaims_and_reuses_space() {
    let mut arena = Arena::new(64).unwrap();
    arena.alloc_align(10, 1).unwrap();

    let mut temp = arena.begin_temp();
    let scratch = temp.alloc_align(4, 1).unwrap();
    assert_eq!(scratch.offset(), 10);
    assert_eq!(temp.used(), 14);
    temp.end();

    assert_eq!(arena.used(), 10);
    let b = arena.alloc_align(6, 1).unwrap();
    assert_eq!(b.offset(), 10);
    assert_eq!(arena.used(), 16);
}

#[test]
fn reset_after_arbitrary_history() {
    let mut arena = Arena::new(512).unwrap();
    let mut log = AllocationLog::new();
    for size in [3, 40, 1, 17, 99] {
        let a = arena.alloc(size).unwrap();
        log.record(a, arena.default_align());
    }
    let latest = log.allocations().last().unwrap();
    arena.resize(Some(latest), 120).unwrap();
    log.assert_valid(&arena);

    arena.reset();
    let fresh = arena.alloc(512).unwrap();
    assert_eq!(fresh.offset(), 0);
    assert_zeroed(&arena, fresh);
}

#[test]
fn resize_latest_vs_earlier() {
    let mut arena = Arena::new(256).unwrap();
    let first = arena.alloc(24).unwrap();
    fill_pattern(&mut arena, first, 11);
    let second = arena.alloc(24).unwrap();
    fill_pattern(&mut arena, second, 22);

    // Latest: in place, same start, prefix intact, tail zeroed.
    let grown = arena.resize(Some(second), 40).unwrap();
    assert_eq!(grown.offset(), second.offset());
    assert_pattern(&arena, grown, 22, 24);
    assert_zeroed(&arena, Allocation::from_raw_parts(grown.offset() + 24, 16));

    // Earlier: relocated after everything else, prefix copied.
    let moved = arena.resize(Some(first), 8).unwrap();
    assert!(moved.offset() >= grown.end().unwrap());
    assert_pattern(&arena, moved, 11, 8);
    // The abandoned original keeps its bytes.
    assert_pattern(&arena, first, 11, 24);
}

#[test]
fn nested_scopes_through_guards() {
    let mut arena = Arena::new(1024).unwrap();
    let keep = arena.alloc(32).unwrap();
    fill_pattern(&mut arena, keep, 5);
    {
        let mut frame = arena.begin_temp();
        frame.alloc(100).unwrap();
        {
            let mut inner = frame.begin_temp();
            inner.alloc(200).unwrap();
            assert_eq!(inner.temp_depth(), 2);
        }
        assert_eq!(frame.temp_depth(), 1);
        assert_eq!(frame.used(), 132);
    }
    assert_eq!(arena.used(), 32);
    assert_pattern(&arena, keep, 5, 32);
}

#[test]
fn freed_arena_rejects_everything() {
    let mut arena = Arena::new(64).unwrap();
    let a = arena.alloc(8).unwrap();
    arena.free();
    assert_eq!(arena.alloc(1), Err(ArenaError::Freed));
    assert_eq!(arena.resize(Some(a), 4), Err(ArenaError::Freed));
    assert!(arena.slice(a).is_none());
    arena.free();
}
