//! # Lock-Striped Lists
//!
//! A fixed number of independently locked lists. Writers targeting different
//! slots never contend; writers targeting the same slot serialize on that
//! slot's lock only.

use parking_lot::Mutex;

/// A fixed set of growable lists, each guarded by its own lock.
///
/// The slot count is fixed at construction. Per-slot capacity only grows:
/// [`StripedLists::clear`] keeps the allocations so the next frame reuses
/// them.
///
/// # Thread Safety
///
/// [`StripedLists::push`] takes `&self` and may be called from any number of
/// threads. [`StripedLists::clear`] and [`StripedLists::slot_mut`] take
/// `&mut self` and bypass the locks entirely.
///
/// # Example
///
/// ```rust,ignore
/// let lists = StripedLists::<u32>::new(4);
/// lists.push(2, 10);
/// lists.push(2, 11);
/// assert_eq!(lists.with_slot(2, |s| s.to_vec()), vec![10, 11]);
/// ```
pub struct StripedLists<T> {
    /// One lock per slot.
    slots: Box<[Mutex<Vec<T>>]>,
}

impl<T> StripedLists<T> {
    /// Creates `slot_count` empty lists.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self::with_capacity(slot_count, 0)
    }

    /// Creates `slot_count` lists, each pre-allocated for `per_slot` items.
    #[must_use]
    pub fn with_capacity(slot_count: usize, per_slot: usize) -> Self {
        let slots: Vec<Mutex<Vec<T>>> = (0..slot_count)
            .map(|_| Mutex::new(Vec::with_capacity(per_slot)))
            .collect();
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Appends `value` to the list in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[inline]
    pub fn push(&self, slot: usize, value: T) {
        self.slots[slot].lock().push(value);
    }

    /// Returns the number of items in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn slot_len(&self, slot: usize) -> usize {
        self.slots[slot].lock().len()
    }

    /// Returns the number of items across all slots.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.slots.iter().map(|slot| slot.lock().len()).sum()
    }

    /// Runs `f` with a read view of `slot`'s items.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn with_slot<R>(&self, slot: usize, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.slots[slot].lock();
        f(&guard)
    }

    /// Returns exclusive access to `slot` without locking.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn slot_mut(&mut self, slot: usize) -> &mut Vec<T> {
        self.slots[slot].get_mut()
    }

    /// Empties every slot, keeping allocations.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.get_mut().clear();
        }
    }

    /// Empties every slot through the locks.
    ///
    /// Used when the lists are shared behind an `Arc` and exclusive access
    /// is not available.
    pub fn clear_shared(&self) {
        for slot in self.slots.iter() {
            slot.lock().clear();
        }
    }
}

impl<T: Clone> StripedLists<T> {
    /// Copies the items of `slot` into a new vector.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn slot_to_vec(&self, slot: usize) -> Vec<T> {
        self.with_slot(slot, <[T]>::to_vec)
    }
}

impl<T> std::fmt::Debug for StripedLists<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripedLists")
            .field("slot_count", &self.slots.len())
            .field("total_len", &self.total_len())
            .finish()
    }
}
