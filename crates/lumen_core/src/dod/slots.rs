// slots.rs - Fixed-capacity slot bookkeeping
//
// Tracks which slots are live, who owns them and each slot's generation.
// Freed slots go on a LIFO free list so the most recently released slot is
// handed out first and stays warm in cache.

use crate::dod::{EntityRef, StoreError};

pub(crate) struct SlotAllocator {
    component: &'static str,
    free: Vec<u32>,
    generations: Box<[u32]>,
    owners: Box<[Option<EntityRef>]>,
}

impl SlotAllocator {
    pub(crate) fn new(component: &'static str, capacity: usize) -> Self {
        // u32::MAX is reserved for Ref::INVALID
        assert!(
            capacity < u32::MAX as usize,
            "{component} capacity {capacity} does not fit a slot index"
        );
        // Reversed so slot 0 is popped first
        let free = (0..capacity as u32).rev().collect();
        Self {
            component,
            free,
            generations: vec![0; capacity].into_boxed_slice(),
            owners: vec![None; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Number of live slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.capacity() - self.free.len()
    }

    /// Claim a free slot for `owner`, returning its index and generation.
    pub(crate) fn alloc(&mut self, owner: EntityRef) -> Option<(u32, u32)> {
        let index = self.free.pop()?;
        self.owners[index as usize] = Some(owner);
        Some((index, self.generations[index as usize]))
    }

    /// Release a live slot. The generation bump invalidates outstanding refs.
    pub(crate) fn release(&mut self, index: usize) {
        debug_assert!(self.owners[index].is_some(), "released a free slot");
        self.owners[index] = None;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free.push(index as u32);
    }

    /// Check that `(index, generation)` names a live slot.
    pub(crate) fn resolve(&self, index: u32, generation: u32) -> Result<usize, StoreError> {
        self.lookup(index, generation).map(|(slot, _)| slot)
    }

    /// Like `resolve`, also returning the slot's owner.
    pub(crate) fn lookup(
        &self,
        index: u32,
        generation: u32,
    ) -> Result<(usize, EntityRef), StoreError> {
        let slot = index as usize;
        let Some(&current) = self.generations.get(slot) else {
            return Err(StoreError::InvalidHandle {
                component: self.component,
                index,
            });
        };
        match self.owners[slot] {
            Some(owner) if current == generation => Ok((slot, owner)),
            _ => Err(StoreError::StaleHandle {
                component: self.component,
                index,
                generation,
                current,
            }),
        }
    }

    #[inline]
    pub(crate) fn owner(&self, index: usize) -> Option<EntityRef> {
        self.owners.get(index).copied().flatten()
    }

    #[inline]
    pub(crate) fn generation(&self, index: usize) -> u32 {
        self.generations[index]
    }

    /// Live slot indices in ascending order.
    pub(crate) fn live(&self) -> impl Iterator<Item = usize> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter_map(|(index, owner)| owner.map(|_| index))
    }
}
