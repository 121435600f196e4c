//! Entity handle with generational index
//!
//! Entities are lightweight handles (8 bytes) that key into the entity
//! manager. The generation counter makes a handle to a removed entity
//! stale forever, even after its slot is reused.

use std::fmt;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Slot in the allocator
/// - Generation: Incremented when the slot is freed
///
/// Example:
/// ```ignore
/// let entity = manager.create(None);
/// manager.remove(entity);
/// // entity handle is now stale (generation mismatch)
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Serialize to 64-bit integer (for logs and save files)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity handles and recycles freed slots.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    occupied: Vec<bool>,
    free: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.occupied[slot] = true;
            return Entity::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.occupied.push(true);
        Entity::new(index, 0)
    }

    /// Release a slot. Returns false for stale or unknown handles.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_current(entity) {
            return false;
        }
        let slot = entity.index as usize;
        self.occupied[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index);
        true
    }

    pub fn is_current(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        slot < self.generations.len()
            && self.occupied[slot]
            && self.generations[slot] == entity.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let entity = Entity::new(7, 3);
        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
        assert_eq!(entity.to_string(), "7v3");
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut allocator = EntityAllocator::new();
        let first = allocator.allocate();
        assert!(allocator.free(first));
        assert!(!allocator.free(first));

        let second = allocator.allocate();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(!allocator.is_current(first));
        assert!(allocator.is_current(second));
    }
}
