use alloc::vec::Vec;
use core::mem;
use bitvec::{order::Lsb0, vec::BitVec};
use crate::{
    tracing_helpers::{debug_log, warn_log},
    util::corrupted,
};
use super::StorageConfig;

/// Slots with an index above this cannot be named by a 32-bit node index.
pub(crate) const MAX_CAPACITY: usize = u32::MAX as usize;

/// A growable array of fixed-size records paired with an occupancy bitset.
///
/// Slot 0 is a sentinel and is never occupied. Slots below the *floor* are never handed out by [`insert_near`] and can only be filled with [`place`]; everything from the floor upwards is managed by the slot search.
///
/// Vacated slots keep their position and get reused, which means that indices are stable for as long as the element they name is live, but may name a different element later on. The number of vacant searchable slots is tracked, which makes the "is full" check constant-time; the search itself is a scan over the bitset words.
///
/// [`insert_near`]: #method.insert_near " "
/// [`place`]: #method.place " "
#[derive(Clone, Debug)]
pub struct SlotStorage<E> {
    elements: Vec<E>,
    occupied: BitVec<usize, Lsb0>,
    floor: usize,
    /// Vacant slots at or above the floor.
    free: usize,
    len: usize,
    growth_increment: usize,
}
impl<E: Default> SlotStorage<E> {
    /// Creates a storage sized according to `config`, in which slots below `floor` are reserved for explicit placement.
    ///
    /// The floor is at least 1, since the sentinel slot is never occupied. The initial capacity is raised to the floor if it's below it.
    ///
    /// # Panics
    /// Panics if `floor` cannot be named by a 32-bit index.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::storage::{SlotStorage, StorageConfig};
    /// let storage = SlotStorage::<u64>::with_config(StorageConfig::new().with_initial_capacity(16), 2);
    /// assert_eq!(storage.capacity(), 16);
    /// assert_eq!(storage.len(), 0);
    /// assert_eq!(storage.free_slots(), 14);
    /// ```
    #[track_caller]
    pub fn with_config(config: StorageConfig, floor: usize) -> Self {
        assert!(
            floor <= MAX_CAPACITY,
            "floor {} lies past the 32-bit index space",
            floor,
        );
        let floor = floor.max(1);
        let mut capacity = config.initial_capacity().max(floor);
        if capacity > MAX_CAPACITY {
            warn_log!(
                requested = capacity,
                "initial capacity exceeds the 32-bit index space, clamping"
            );
            capacity = MAX_CAPACITY;
        }
        let mut elements = Vec::with_capacity(capacity);
        elements.resize_with(capacity, E::default);
        Self {
            elements,
            occupied: BitVec::repeat(false, capacity),
            floor,
            free: capacity - floor,
            len: 0,
            growth_increment: config.growth_increment(),
        }
    }

    /// Stores `element` in the vacant slot at `index`, which may lie below the floor.
    ///
    /// # Panics
    /// Panics if `index` is 0, out of bounds or already occupied.
    #[track_caller]
    pub fn place(&mut self, index: usize, element: E) {
        assert!(index != 0, "the sentinel slot cannot be occupied");
        assert!(
            index < self.capacity(),
            "slot {} is out of bounds for a storage with capacity {}",
            index,
            self.capacity(),
        );
        assert!(!self.occupied[index], "slot {} is already occupied", index);
        self.occupy(index, element);
    }

    /// Stores `element` in a vacant slot close to `hint` and returns the index of that slot.
    ///
    /// The slots from `hint` upwards are searched first, then the ones between the floor and `hint`. The storage is grown beforehand if there are no vacant slots at all. The returned index is not necessarily the lowest vacant one.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::storage::{SlotStorage, StorageConfig};
    /// let config = StorageConfig::new().with_initial_capacity(4).with_growth_increment(4);
    /// let mut storage = SlotStorage::with_config(config, 2);
    /// let a = storage.insert_near(2, 'a');
    /// let b = storage.insert_near(2, 'b');
    /// // The storage is full now, so it grows to make room for the next element.
    /// let c = storage.insert_near(2, 'c');
    /// assert_eq!(storage.capacity(), 8);
    /// assert_eq!(storage.get(a), Some(&'a'));
    /// assert_eq!(storage.get(b), Some(&'b'));
    /// assert_eq!(storage.get(c), Some(&'c'));
    /// ```
    pub fn insert_near(&mut self, hint: usize, element: E) -> usize {
        self.insert_near_with(hint, |_| element)
    }
    /// Stores the element produced by `f` in a vacant slot close to `hint` and returns the index of that slot.
    ///
    /// The closure receives the index of the slot the element is going to be stored in, for elements which need to know it in advance. The slot search works the same way as in [`insert_near`].
    ///
    /// [`insert_near`]: #method.insert_near " "
    pub fn insert_near_with(&mut self, hint: usize, f: impl FnOnce(usize) -> E) -> usize {
        if self.free == 0 {
            self.grow();
        }
        let start = hint.max(self.floor).min(self.capacity());
        let index = self
            .first_vacant_in(start, self.capacity())
            .or_else(|| self.first_vacant_in(self.floor, start))
            .unwrap_or_else(|| {
                corrupted(format_args!(
                    "no vacant slot found although {} were accounted as free",
                    self.free,
                ))
            });
        self.occupy(index, f(index));
        index
    }

    /// Vacates the slot at `index`, returning the element it held, or `None` if the slot was not occupied.
    ///
    /// The slot is reset to `E::default()` and becomes available for reuse.
    pub fn vacate(&mut self, index: usize) -> Option<E> {
        if !self.contains(index) {
            return None;
        }
        self.occupied.set(index, false);
        self.len -= 1;
        if index >= self.floor {
            self.free += 1;
        }
        Some(mem::take(&mut self.elements[index]))
    }

    /// Appends one growth increment worth of vacant slots, without touching the existing ones.
    fn grow(&mut self) {
        let old_capacity = self.capacity();
        if old_capacity >= MAX_CAPACITY {
            corrupted("the 32-bit index space is exhausted");
        }
        let new_capacity = old_capacity
            .saturating_add(self.growth_increment)
            .min(MAX_CAPACITY);
        self.elements.resize_with(new_capacity, E::default);
        self.occupied.resize(new_capacity, false);
        self.free += new_capacity - old_capacity;
        debug_log!(old_capacity, new_capacity, "grew slot storage");
    }
}
impl<E> SlotStorage<E> {
    fn occupy(&mut self, index: usize, element: E) {
        self.elements[index] = element;
        self.occupied.set(index, true);
        self.len += 1;
        if index >= self.floor {
            self.free -= 1;
        }
    }
    fn first_vacant_in(&self, from: usize, to: usize) -> Option<usize> {
        if from >= to {
            return None;
        }
        self.occupied[from..to].first_zero().map(|offset| offset + from)
    }

    /// Returns `true` if the slot at `index` holds an element, `false` if it's vacant or out of bounds.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity() && self.occupied[index]
    }
    /// Returns a reference to the element at `index`, or `None` if the slot is vacant or out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&E> {
        if self.contains(index) {
            self.elements.get(index)
        } else {
            None
        }
    }
    /// Returns a *mutable* reference to the element at `index`, or `None` if the slot is vacant or out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        if self.contains(index) {
            self.elements.get_mut(index)
        } else {
            None
        }
    }
    /// Returns the number of occupied slots.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }
    /// Returns `true` if no slot is occupied.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Returns the number of slots, occupied or not, including the sentinel.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }
    /// Returns the number of vacant slots which the slot search can hand out without growing.
    #[inline(always)]
    pub fn free_slots(&self) -> usize {
        self.free
    }
    /// Returns the lowest index the slot search can hand out.
    #[inline(always)]
    pub fn floor(&self) -> usize {
        self.floor
    }
    /// Returns an iterator over the indices of the occupied slots, in ascending order.
    pub fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.occupied.iter_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::collections::BTreeSet;

    fn small(initial: usize, growth: usize) -> SlotStorage<u32> {
        let config = StorageConfig::new()
            .with_initial_capacity(initial)
            .with_growth_increment(growth);
        SlotStorage::with_config(config, 2)
    }

    #[test]
    fn sentinel_is_never_handed_out() {
        let mut storage = small(4, 4);
        storage.place(1, 100);
        let mut seen = BTreeSet::new();
        for i in 0..50 {
            let index = storage.insert_near(1, i);
            assert!(index >= 2);
            assert!(seen.insert(index), "slot {} handed out twice", index);
        }
        assert!(!storage.contains(0));
        assert_eq!(storage.occupied_indices().next(), Some(1));
    }

    #[test]
    #[should_panic(expected = "sentinel")]
    fn placing_into_sentinel_panics() {
        small(4, 4).place(0, 1);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn placing_twice_panics() {
        let mut storage = small(4, 4);
        storage.place(1, 1);
        storage.place(1, 2);
    }

    #[test]
    fn growth_preserves_elements() {
        let mut storage = small(4, 3);
        let mut placed = vec![];
        for i in 0..20 {
            placed.push((storage.insert_near(2, i), i));
        }
        assert!(storage.capacity() >= 22);
        assert_eq!(storage.len(), 20);
        for (index, value) in placed {
            assert_eq!(storage.get(index), Some(&value));
        }
    }

    #[test]
    fn vacated_slots_are_reused() {
        let mut storage = small(6, 6);
        let indices: Vec<usize> = (0..4).map(|i| storage.insert_near(2, i)).collect();
        assert_eq!(storage.free_slots(), 0);
        assert_eq!(storage.vacate(indices[1]), Some(1));
        assert_eq!(storage.vacate(indices[1]), None);
        assert_eq!(storage.free_slots(), 1);
        let reused = storage.insert_near(2, 9);
        assert_eq!(reused, indices[1]);
        assert_eq!(storage.capacity(), 6);
    }

    #[test]
    fn search_wraps_below_the_hint() {
        let mut storage = small(8, 8);
        let low = storage.insert_near(2, 0);
        for i in 1..6 {
            storage.insert_near(2, i);
        }
        storage.vacate(low);
        // Nothing is vacant above slot 7, so the search has to wrap around to the low slot.
        let index = storage.insert_near(7, 42);
        assert_eq!(index, low);
        assert_eq!(storage.get(index), Some(&42));
    }

    #[test]
    fn search_prefers_slots_after_the_hint() {
        let mut storage = small(16, 16);
        let _ = storage.insert_near(2, 0);
        let index = storage.insert_near(10, 1);
        assert!(index >= 10);
    }

    #[test]
    fn vacated_slots_are_reset() {
        let mut storage = small(4, 4);
        let index = storage.insert_near(2, 7);
        storage.vacate(index);
        assert_eq!(storage.get(index), None);
        assert_eq!(storage.elements[index], 0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "32-bit index space")]
    fn floor_past_the_index_space_panics() {
        SlotStorage::<u32>::with_config(StorageConfig::new(), usize::MAX);
    }

    #[test]
    fn out_of_bounds_lookups_are_none() {
        let storage = small(4, 4);
        assert!(!storage.contains(1000));
        assert_eq!(storage.get(1000), None);
    }
}
