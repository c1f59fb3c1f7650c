use super::bucket::Bucket;
use super::Slot;
use crate::Error;

use std::any::{type_name, Any};

/// An observable view of one cache entry.
///
/// [`EntrySnapshot`] is the concrete entry type; generic code holding a
/// `dyn Entry` recovers it through the `downcast` method.
pub trait Entry<K, V> {
    /// The entry's key.
    fn key(&self) -> &K;
    /// The entry's value.
    fn value(&self) -> &V;
    /// The cached hash of the entry's key.
    fn hash(&self) -> u64;
    /// Whether the entry was live when observed.
    fn is_set(&self) -> bool;
    /// A type-erased view of the concrete entry.
    fn as_any(&self) -> &dyn Any;
}

impl<'a, K, V> dyn Entry<K, V> + 'a {
    /// Recovers the concrete type behind this entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryType`] unless `T` is the entry's concrete
    /// type.
    pub fn downcast<T: 'static>(&self) -> Result<&T, Error> {
        self.as_any().downcast_ref().ok_or(Error::EntryType {
            requested: type_name::<T>(),
        })
    }
}

/// An owned copy of one set slot, decoupled from the slot's storage.
///
/// A snapshot keeps its contents even after the cache reuses the
/// underlying slot for another key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySnapshot<K, V> {
    key: K,
    value: V,
    hash: u64,
}

impl<K, V> EntrySnapshot<K, V> {
    pub(crate) fn copy_of(slot: &Slot<K, V>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self {
            key: slot.key().expect("snapshot of an unset slot").clone(),
            value: slot.value().expect("snapshot of an unset slot").clone(),
            hash: slot.hash(),
        }
    }

    /// The entry's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The entry's value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The cached hash of the entry's key.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Always `true`: snapshots are taken of set slots only.
    pub fn is_set(&self) -> bool {
        true
    }

    /// Consumes the snapshot into its key/value pair.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: 'static, V: 'static> Entry<K, V> for EntrySnapshot<K, V> {
    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn hash(&self) -> u64 {
        self.hash
    }

    fn is_set(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An iterator yielding a snapshot of every live entry in the cache.
///
/// Entries are visited bucket by bucket, slot by slot, in storage order.
/// Each item is an owned copy: the bucket may reuse the underlying slot
/// for a later key while the snapshot is still held.
pub struct Iter<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    bucket_index: usize,
    slot_index: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Bucket<K, V>]) -> Self {
        Self {
            buckets,
            bucket_index: 0,
            slot_index: 0,
        }
    }
}

impl<K, V> Iterator for Iter<'_, K, V>
where
    K: Clone,
    V: Clone,
{
    type Item = EntrySnapshot<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.get(self.bucket_index) {
            while let Some(slot) = bucket.slots().get(self.slot_index) {
                self.slot_index += 1;
                if slot.is_set() {
                    return Some(EntrySnapshot::copy_of(slot));
                }
            }
            self.bucket_index += 1;
            self.slot_index = 0;
        }
        None
    }
}
