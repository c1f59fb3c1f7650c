//! Per-bucket eviction policies.
//!
//! Every bucket owns one [`Invalidator`]: an index over the bucket's set
//! slots that yields a victim when the bucket overflows. Three policies
//! ship with the crate: [`Lru`] (the default), [`Mru`], and
//! [`SmallestValue`]. Callers can supply their own through
//! [`CacheBuilder::invalidator`](crate::unsync::CacheBuilder::invalidator).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::common::deque::Deque;
use crate::unsync::Slot;

/// A per-bucket eviction index.
///
/// Implementations track slots by their index within the owning bucket
/// (slot identity is stable for the cache's lifetime) and never own slot
/// storage; the bucket's live slot array is passed to each call.
///
/// The cache maintains the following discipline and relies on it:
///
/// - after `touch(i)`, slot `i` is a member of the index;
/// - after `remove(i)`, or after `invalidate` picked slot `i`, it is not;
/// - `invalidate` returns `false` only when the index tracks no set slot.
///
/// On value updates the cache touches the slot both before and after the
/// new value is written, so value-ordered policies re-rank against the
/// freshly stored value.
pub trait Invalidator<K, V> {
    /// Records that `slot` was just written or read.
    ///
    /// Repeated touches of the same slot must not duplicate membership;
    /// they re-rank the slot under the policy.
    fn touch(&mut self, slot: usize, slots: &[Slot<K, V>]);

    /// Drops `slot` from the index. A no-op if it is not a member.
    fn remove(&mut self, slot: usize);

    /// Picks one victim under the policy, unsets it, drops it from the
    /// index, and returns `true`; returns `false` if the index is empty.
    fn invalidate(&mut self, slots: &mut [Slot<K, V>]) -> bool;
}

/// Evicts the least recently touched slot.
pub struct Lru {
    order: Deque,
}

impl Lru {
    /// Creates an index for a bucket of `ways` slots.
    pub fn new(ways: usize) -> Self {
        Self {
            order: Deque::new(ways),
        }
    }
}

impl<K, V> Invalidator<K, V> for Lru {
    fn touch(&mut self, slot: usize, _slots: &[Slot<K, V>]) {
        self.order.move_to_back(slot);
    }

    fn remove(&mut self, slot: usize) {
        self.order.unlink(slot);
    }

    fn invalidate(&mut self, slots: &mut [Slot<K, V>]) -> bool {
        match self.order.pop_front() {
            Some(victim) => {
                slots[victim].unset();
                true
            }
            None => false,
        }
    }
}

/// Evicts the most recently touched slot.
///
/// Shares its access-order list with [`Lru`]; only the end the victim is
/// taken from differs.
pub struct Mru {
    order: Deque,
}

impl Mru {
    /// Creates an index for a bucket of `ways` slots.
    pub fn new(ways: usize) -> Self {
        Self {
            order: Deque::new(ways),
        }
    }
}

impl<K, V> Invalidator<K, V> for Mru {
    fn touch(&mut self, slot: usize, _slots: &[Slot<K, V>]) {
        self.order.move_to_back(slot);
    }

    fn remove(&mut self, slot: usize) {
        self.order.unlink(slot);
    }

    fn invalidate(&mut self, slots: &mut [Slot<K, V>]) -> bool {
        match self.order.pop_back() {
            Some(victim) => {
                slots[victim].unset();
                true
            }
            None => false,
        }
    }
}

/// Evicts the slot holding the smallest value.
///
/// Priorities live in a min-heap of `(value, generation, slot)` triples
/// with lazy deletion: `remove` only clears a membership flag, and stale
/// heap entries are skipped during `invalidate` (and compacted away once
/// they outnumber the live ones). Every touch re-pushes the slot under
/// the value it holds at that moment, so an updated value takes effect on
/// the touch that follows the write.
pub struct SmallestValue<V> {
    heap: BinaryHeap<Reverse<(V, u64, u32)>>,
    states: Box<[SlotState]>,
}

#[derive(Clone, Copy, Default)]
struct SlotState {
    generation: u64,
    member: bool,
}

impl<V: Ord + Clone> SmallestValue<V> {
    /// Creates an index for a bucket of `ways` slots.
    pub fn new(ways: usize) -> Self {
        assert!(ways <= u32::MAX as usize, "too many ways");
        Self {
            heap: BinaryHeap::new(),
            states: vec![SlotState::default(); ways].into_boxed_slice(),
        }
    }

    /// Drops stale heap entries once they outnumber the live ones.
    fn compact(&mut self) {
        if self.heap.len() <= 2 * self.states.len() + 8 {
            return;
        }
        let states = &self.states;
        self.heap.retain(|Reverse((_, generation, slot))| {
            let state = states[*slot as usize];
            state.member && state.generation == *generation
        });
    }
}

impl<K, V> Invalidator<K, V> for SmallestValue<V>
where
    V: Ord + Clone,
{
    fn touch(&mut self, slot: usize, slots: &[Slot<K, V>]) {
        let value = slots[slot]
            .value()
            .expect("touched slot holds no value")
            .clone();
        let state = &mut self.states[slot];
        state.generation += 1;
        state.member = true;
        self.heap
            .push(Reverse((value, state.generation, slot as u32)));
        self.compact();
    }

    fn remove(&mut self, slot: usize) {
        self.states[slot].member = false;
    }

    fn invalidate(&mut self, slots: &mut [Slot<K, V>]) -> bool {
        while let Some(Reverse((_, generation, slot))) = self.heap.pop() {
            let slot = slot as usize;
            let state = &mut self.states[slot];
            if state.member && state.generation == generation {
                state.member = false;
                slots[slot].unset();
                return true;
            }
        }
        false
    }
}
