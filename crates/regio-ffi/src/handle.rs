//! Slot + generation handle table for arenas owned on behalf of C callers.
//!
//! A handle packs the slot index into the upper 32 bits and the slot's
//! generation into the lower 32. Removing a value bumps the generation, so
//! a freed handle no longer matches its slot and lookups return `None`
//! instead of touching whatever now lives there. Freeing twice is therefore
//! a harmless `None`.

fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (u32, u32) {
    ((handle >> 32) as u32, handle as u32)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned values addressed by `u64` handles, with slot reuse.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value`, reusing a vacant slot when one exists.
    pub fn insert(&mut self, value: T) -> u64 {
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                pack(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                pack(index, 0)
            }
        }
    }

    fn live_slot(&self, handle: u64) -> Option<&Slot<T>> {
        let (index, generation) = unpack(handle);
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
    }

    /// Shared access to the value behind `handle`.
    pub fn get(&self, handle: u64) -> Option<&T> {
        self.live_slot(handle)?.value.as_ref()
    }

    /// Exclusive access to the value behind `handle`.
    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let (index, generation) = unpack(handle);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Take the value out and invalidate `handle`.
    ///
    /// A slot whose generation wraps back to 0 is retired instead of being
    /// made vacant, so a handle from its first life can never match again.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.vacant.push(index);
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut table = HandleTable::new();
        let h = table.insert("a");
        assert_eq!(table.get(h), Some(&"a"));
    }

    #[test]
    fn removed_handle_is_dead() {
        let mut table = HandleTable::new();
        let h = table.insert(5u8);
        assert_eq!(table.remove(h), Some(5));
        assert_eq!(table.get(h), None);
        assert_eq!(table.get_mut(h), None);
        assert_eq!(table.remove(h), None);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut table = HandleTable::new();
        let first = table.insert(1u8);
        table.remove(first);
        let second = table.insert(2u8);
        assert_eq!(unpack(first).0, unpack(second).0);
        assert_eq!(unpack(second).1, unpack(first).1 + 1);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }

    #[test]
    fn unknown_slot_is_none() {
        let table: HandleTable<u8> = HandleTable::new();
        assert_eq!(table.get(pack(42, 0)), None);
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(0u8);
        table.remove(h);
        table.slots[0].generation = u32::MAX;
        let last = table.insert(1u8);
        assert_eq!(unpack(last), (0, u32::MAX));
        table.remove(last);

        assert_eq!(table.slots[0].generation, 0);
        assert!(!table.vacant.contains(&0));
        assert_eq!(table.get(pack(0, 0)), None);
        let fresh = table.insert(2u8);
        assert_eq!(unpack(fresh).0, 1);
    }
}
