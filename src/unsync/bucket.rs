use crate::eviction::Invalidator;
use crate::unsync::Slot;

/// One set of the cache: a fixed array of slots, the invalidator that
/// orders them for eviction, and a live-slot counter.
pub(crate) struct Bucket<K, V> {
    slots: Box<[Slot<K, V>]>,
    invalidator: Box<dyn Invalidator<K, V>>,
    len: usize,
}

impl<K, V> Bucket<K, V> {
    pub(crate) fn new(ways: usize, invalidator: Box<dyn Invalidator<K, V>>) -> Self {
        Self {
            slots: (0..ways).map(|_| Slot::new()).collect(),
            invalidator,
            len: 0,
        }
    }

    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    pub(crate) fn slot(&self, index: usize) -> &Slot<K, V> {
        &self.slots[index]
    }

    pub(crate) fn ways(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Tells the invalidator the slot at `index` was just read or written.
    pub(crate) fn touch(&mut self, index: usize) {
        self.invalidator.touch(index, &self.slots);
    }

    /// Writes a fresh entry into the unset slot at `index`.
    pub(crate) fn assign(&mut self, index: usize, key: K, value: V, hash: u64) {
        self.slots[index].assign(key, value, hash);
        self.len += 1;
    }

    /// Replaces the value of the set slot at `index`, returning the
    /// previous one.
    pub(crate) fn replace_value(&mut self, index: usize, value: V) -> V {
        self.slots[index].replace_value(value)
    }

    /// Removes the entry at `index`: drops it from the invalidator, unsets
    /// the slot, and decrements the counter. Returns the stored value.
    pub(crate) fn remove(&mut self, index: usize) -> Option<V> {
        self.invalidator.remove(index);
        let previous = self.slots[index].unset();
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    /// Asks the invalidator to shed one slot. Returns whether it did.
    pub(crate) fn invalidate(&mut self) -> bool {
        if self.invalidator.invalidate(&mut self.slots) {
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Unsets every slot, removing each from the invalidator first so the
    /// index stays in step with the (now empty) slot array.
    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_set() {
                self.invalidator.remove(index);
                slot.unset();
            }
        }
        self.len = 0;
    }
}
