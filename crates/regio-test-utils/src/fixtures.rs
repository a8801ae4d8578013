//! Scripted arena workloads.
//!
//! A script is a list of [`ScriptOp`]s replayed against an arena by
//! [`run_script`]. Scopes are driven through checkpoints rather than
//! [`TempArena`](regio_arena::TempArena) guards so that a flat list can
//! open and close them.
//!
//! - [`frame_script`]: per-frame scratch pattern (begin, allocate, end).
//! - [`growing_vec_script`]: one buffer grown repeatedly in place.

use regio_arena::{Allocation, Arena, ArenaError, Checkpoint};

/// One step of a scripted workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptOp {
    /// Allocate `size` bytes at `align`.
    Alloc { size: usize, align: usize },
    /// Resize the `index`-th handle produced so far to `new_size`.
    Resize { index: usize, new_size: usize },
    /// Open a checkpoint scope.
    Begin,
    /// Restore the innermost checkpoint opened by `Begin`.
    End,
    /// Reset the arena (drops all open script scopes).
    Reset,
}

/// Result of replaying a script.
#[derive(Debug, Default)]
pub struct ScriptOutcome {
    /// One entry per `Alloc` / `Resize`: the handle, or `None` on failure.
    pub handles: Vec<Option<Allocation>>,
    /// Errors returned by the arena, in order.
    pub errors: Vec<ArenaError>,
}

impl ScriptOutcome {
    /// Number of `Alloc` / `Resize` steps that succeeded.
    pub fn succeeded(&self) -> usize {
        self.handles.iter().filter(|h| h.is_some()).count()
    }
}

/// Replay `ops` against `arena`.
///
/// `Resize` of an index that failed earlier resizes `None`, i.e. allocates.
/// `End` without an open `Begin` is ignored. Scopes still open when the
/// script finishes are left open.
pub fn run_script(arena: &mut Arena, ops: &[ScriptOp]) -> ScriptOutcome {
    let mut outcome = ScriptOutcome::default();
    let mut open: Vec<Checkpoint> = Vec::new();

    for op in ops {
        match *op {
            ScriptOp::Alloc { size, align } => {
                let result = arena.alloc_align(size, align);
                push_result(&mut outcome, result);
            }
            ScriptOp::Resize { index, new_size } => {
                let old = outcome.handles.get(index).copied().flatten();
                let result = arena.resize(old, new_size);
                push_result(&mut outcome, result);
            }
            ScriptOp::Begin => open.push(arena.save()),
            ScriptOp::End => {
                if let Some(cp) = open.pop() {
                    if let Err(e) = arena.restore(cp) {
                        outcome.errors.push(e);
                    }
                }
            }
            ScriptOp::Reset => {
                arena.reset();
                open.clear();
            }
        }
    }
    outcome
}

fn push_result(outcome: &mut ScriptOutcome, result: Result<Allocation, ArenaError>) {
    match result {
        Ok(a) => outcome.handles.push(Some(a)),
        Err(e) => {
            outcome.handles.push(None);
            outcome.errors.push(e);
        }
    }
}

/// `frames` rounds of: begin scope, allocate each of `sizes`, end scope.
pub fn frame_script(frames: usize, sizes: &[usize]) -> Vec<ScriptOp> {
    let mut ops = Vec::with_capacity(frames * (sizes.len() + 2));
    for _ in 0..frames {
        ops.push(ScriptOp::Begin);
        ops.extend(sizes.iter().map(|&size| ScriptOp::Alloc { size, align: 8 }));
        ops.push(ScriptOp::End);
    }
    ops
}

/// Allocate `initial` bytes, then double the latest handle `doublings`
/// times. Every resize targets the most recent allocation.
pub fn growing_vec_script(initial: usize, doublings: usize) -> Vec<ScriptOp> {
    let mut ops = vec![ScriptOp::Alloc {
        size: initial,
        align: 8,
    }];
    let mut size = initial;
    for i in 0..doublings {
        size *= 2;
        ops.push(ScriptOp::Resize {
            index: i,
            new_size: size,
        });
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_script_leaves_arena_empty() {
        let mut arena = Arena::new(1024).unwrap();
        let outcome = run_script(&mut arena, &frame_script(10, &[16, 32, 64]));
        assert_eq!(outcome.succeeded(), 30);
        assert!(outcome.errors.is_empty());
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.temp_depth(), 0);
    }

    #[test]
    fn growing_vec_stays_at_offset_zero() {
        let mut arena = Arena::new(4096).unwrap();
        let outcome = run_script(&mut arena, &growing_vec_script(8, 5));
        assert!(outcome.errors.is_empty());
        for h in &outcome.handles {
            assert_eq!(h.unwrap().offset(), 0);
        }
        assert_eq!(arena.used(), 256);
    }

    #[test]
    fn failures_are_recorded() {
        let mut arena = Arena::new(16).unwrap();
        let ops = [
            ScriptOp::Alloc { size: 10, align: 1 },
            ScriptOp::Alloc { size: 10, align: 1 },
        ];
        let outcome = run_script(&mut arena, &ops);
        assert_eq!(outcome.succeeded(), 1);
        assert!(matches!(
            outcome.errors[0],
            ArenaError::CapacityExceeded { .. }
        ));
    }

    #[test]
    fn reset_drops_open_scopes() {
        let mut arena = Arena::new(64).unwrap();
        let ops = [
            ScriptOp::Begin,
            ScriptOp::Alloc { size: 8, align: 1 },
            ScriptOp::Reset,
            ScriptOp::End,
        ];
        let outcome = run_script(&mut arena, &ops);
        assert!(outcome.errors.is_empty());
        assert_eq!(arena.temp_depth(), 0);
    }
}
