// manager.rs - Fixed-capacity SoA component manager
//
// One manager owns every record of one component kind. Attributes live in
// the column set `D`, one contiguous array per attribute, all sized to the
// capacity chosen at construction.

use crate::dod::slots::SlotAllocator;
use crate::dod::{ColumnSet, EntityRef, Ref, StoreError};

/// Input length at which sorts switch from sequential to rayon.
pub const DEFAULT_PARALLEL_SORT_THRESHOLD: usize = 1024;

/// Storage for all records of a single component kind.
///
/// Capacity is a hard ceiling: `create` fails instead of reallocating, so
/// columns never move and outstanding refs stay addressable for the whole
/// frame.
///
/// Every accessor resolves its ref against the slot's generation first. A
/// destroyed or reused slot reports [`StoreError::StaleHandle`] instead of
/// handing out another record's data.
///
/// The manager has no interior locking. Writers take `&mut self`; readers
/// such as the sorter or the descriptor codec only need `&self` and may run
/// side by side between write phases.
pub struct ComponentManager<D: ColumnSet> {
    slots: SlotAllocator,
    data: D,
    parallel_sort_threshold: usize,
}

impl<D: ColumnSet> ComponentManager<D> {
    /// Create a manager with room for exactly `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SlotAllocator::new(D::NAME, capacity),
            data: D::with_capacity(capacity),
            parallel_sort_threshold: DEFAULT_PARALLEL_SORT_THRESHOLD,
        }
    }

    /// Set the input length from which sorts fan out across rayon workers.
    pub fn with_parallel_sort_threshold(mut self, threshold: usize) -> Self {
        self.parallel_sort_threshold = threshold;
        self
    }

    #[inline]
    pub fn parallel_sort_threshold(&self) -> usize {
        self.parallel_sort_threshold
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Allocate a record for `owner`.
    ///
    /// The slot's columns are reset to defaults before the ref is returned,
    /// so a reused slot never shows the previous occupant's values.
    pub fn create(&mut self, owner: EntityRef) -> Result<Ref<D>, StoreError> {
        let Some((index, generation)) = self.slots.alloc(owner) else {
            tracing::warn!(
                component = D::NAME,
                capacity = self.capacity(),
                %owner,
                "component store full, creation denied"
            );
            return Err(StoreError::CapacityExceeded {
                component: D::NAME,
                capacity: self.capacity(),
            });
        };

        self.data.reset_slot(index as usize);
        tracing::debug!(component = D::NAME, index, generation, %owner, "component created");
        Ok(Ref::new(index, generation))
    }

    /// Release a record. Its slot is immediately available to `create`.
    ///
    /// `r` itself is left untouched; any later use reports a stale ref.
    pub fn destroy(&mut self, r: Ref<D>) -> Result<(), StoreError> {
        let index = self.resolve(r)?;
        self.slots.release(index);
        tracing::debug!(component = D::NAME, index, "component destroyed");
        Ok(())
    }

    /// Restore a live record's defaults without touching its liveness.
    pub fn reset_to_default(&mut self, r: Ref<D>) -> Result<(), StoreError> {
        let index = self.resolve(r)?;
        self.data.reset_slot(index);
        Ok(())
    }

    /// Map a ref to its column index, rejecting stale and invalid refs.
    #[inline]
    pub fn resolve(&self, r: Ref<D>) -> Result<usize, StoreError> {
        self.slots.resolve(r.index(), r.generation())
    }

    #[inline]
    pub fn is_alive(&self, r: Ref<D>) -> bool {
        self.resolve(r).is_ok()
    }

    /// The owner recorded at creation.
    pub fn owner(&self, r: Ref<D>) -> Result<EntityRef, StoreError> {
        self.slots
            .lookup(r.index(), r.generation())
            .map(|(_, owner)| owner)
    }

    /// Find the live record created for `owner`, if any.
    ///
    /// Linear in capacity; meant for the entity system's destruction
    /// cascades, not per-frame lookups.
    pub fn find_by_owner(&self, owner: EntityRef) -> Option<Ref<D>> {
        self.slots
            .live()
            .find(|&index| self.slots.owner(index) == Some(owner))
            .map(|index| self.ref_at(index))
    }

    /// Refs to every live record, in slot order.
    pub fn active_refs(&self) -> Vec<Ref<D>> {
        self.slots.live().map(|index| self.ref_at(index)).collect()
    }

    /// Direct access to the columns for bulk scans.
    ///
    /// Rows of free slots hold stale or default values; use
    /// [`active_refs`](Self::active_refs) or [`resolve`](Self::resolve) to
    /// pick live rows.
    #[inline]
    pub fn data(&self) -> &D {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Resolve `r` and borrow the columns alongside the slot index.
    #[inline]
    pub fn slot(&self, r: Ref<D>) -> Result<(&D, usize), StoreError> {
        let index = self.resolve(r)?;
        Ok((&self.data, index))
    }

    #[inline]
    pub fn slot_mut(&mut self, r: Ref<D>) -> Result<(&mut D, usize), StoreError> {
        let index = self.resolve(r)?;
        Ok((&mut self.data, index))
    }

    fn ref_at(&self, index: usize) -> Ref<D> {
        Ref::new(index as u32, self.slots.generation(index))
    }
}
