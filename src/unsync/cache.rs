use super::bucket::Bucket;
use super::{CacheBuilder, EntrySnapshot, InvalidatorFactory, Iter, Slot};
use crate::eviction::Lru;
use crate::{Error, Policy, Result};

use log::{debug, trace, warn};
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ptr;

/// An in-memory, N-way set-associative cache that is _not_ thread-safe.
///
/// A `Cache` is constructed as `sets × ways`: every key hashes to exactly
/// one of `sets` buckets, and each bucket stores up to `ways` entries in
/// slots that are allocated once and reused for the cache's lifetime.
/// Within a bucket, lookups probe the slot array starting at the key's
/// home position and wrap around, so every operation inspects at most
/// `ways` slots regardless of the cache's total size.
///
/// When an insert meets a full bucket, the bucket's invalidator (its
/// eviction policy) drops one entry to make room. Eviction is strictly
/// per bucket; entries never spill into neighboring buckets. The policy
/// defaults to least recently used and can be swapped per cache through
/// [`CacheBuilder::invalidator`].
///
/// # Examples
///
/// ```rust
/// use waycache::unsync::Cache;
///
/// // Eight buckets of four slots each.
/// let mut cache = Cache::new(8, 4)?;
///
/// cache.put("a", 1)?;
/// cache.put("b", 2)?;
///
/// assert_eq!(cache.get(&"a"), Some(&1));
/// assert_eq!(cache.len(), 2);
///
/// cache.remove(&"b");
/// assert!(!cache.contains_key(&"b"));
/// # Ok::<(), waycache::Error>(())
/// ```
///
/// A single bucket with two slots, overflowing:
///
/// ```rust
/// use waycache::unsync::Cache;
///
/// let mut cache = Cache::new(1, 2)?;
/// cache.put("first", 1)?;
/// cache.put("second", 2)?;
/// cache.put("third", 3)?;
///
/// // The least recently used entry made room for the third insert.
/// assert_eq!(cache.len(), 2);
/// assert!(!cache.contains_key(&"first"));
/// # Ok::<(), waycache::Error>(())
/// ```
///
/// # Hashing Algorithm
///
/// By default, `Cache` uses the same hashing algorithm as
/// `std::collections::HashMap`, which provides resistance against HashDoS
/// attacks. The algorithm can be replaced on a per-`Cache` basis using
/// the [`build_with_hasher`][build-with-hasher-method] method of the
/// `CacheBuilder`.
///
/// [build-with-hasher-method]: ./struct.CacheBuilder.html#method.build_with_hasher
pub struct Cache<K, V, S = RandomState> {
    buckets: Box<[Bucket<K, V>]>,
    len: usize,
    build_hasher: S,
}

impl<K, V, S> fmt::Debug for Cache<K, V, S>
where
    K: fmt::Debug + Clone,
    V: fmt::Debug + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d_map = f.debug_map();

        for entry in self.iter() {
            d_map.entry(entry.key(), entry.value());
        }

        d_map.finish()
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
{
    /// Constructs a cache of `sets` buckets holding `ways` slots each,
    /// with the default hasher and least-recently-used eviction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `sets` or `ways` is zero.
    pub fn new(sets: usize, ways: usize) -> Result<Self> {
        Self::builder(sets, ways).build()
    }

    /// Returns a [`CacheBuilder`] for a cache of the given geometry.
    pub fn builder(sets: usize, ways: usize) -> CacheBuilder<K, V> {
        CacheBuilder::new(sets, ways)
    }
}

impl<K, V, S> Cache<K, V, S> {
    /// Returns the geometry of this cache.
    pub fn policy(&self) -> Policy {
        Policy::new(self.buckets.len(), self.buckets[0].ways())
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entry is live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Creates an iterator over snapshots of every live entry.
    ///
    /// Visiting entries through the iterator does not inform any bucket's
    /// invalidator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use waycache::unsync::Cache;
    ///
    /// let mut cache = Cache::new(4, 4)?;
    /// cache.put("Julia", 14)?;
    ///
    /// let mut iter = cache.iter();
    /// let entry = iter.next().unwrap();
    /// assert_eq!(entry.key(), &"Julia");
    /// assert_eq!(entry.value(), &14);
    ///
    /// assert!(iter.next().is_none());
    /// # Ok::<(), waycache::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets)
    }

    /// Collects a snapshot of every live entry.
    pub fn entries(&self) -> Vec<EntrySnapshot<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().collect()
    }

    /// Collects the key of every live entry.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.slots())
            .filter_map(|slot| slot.key().cloned())
            .collect()
    }

    /// Collects the value of every live entry.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.slots())
            .filter_map(|slot| slot.value().cloned())
            .collect()
    }

    /// Scans every live entry for `value`.
    ///
    /// An entry matches if its value is the probed value itself or
    /// compares equal to it. Like [`contains_key`](Self::contains_key),
    /// this never informs any invalidator.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.slots())
            .filter_map(Slot::value)
            .any(|stored| ptr::eq(stored, value) || stored == value)
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn with_everything(
        sets: usize,
        ways: usize,
        factory: Option<InvalidatorFactory<K, V>>,
        build_hasher: S,
    ) -> Result<Self> {
        if sets == 0 || ways == 0 {
            return Err(Error::Configuration { sets, ways });
        }

        let factory =
            factory.unwrap_or_else(|| Box::new(|ways| Box::new(Lru::new(ways))));
        let buckets = (0..sets)
            .map(|_| Bucket::new(ways, factory(ways)))
            .collect();

        Ok(Self {
            buckets,
            len: 0,
            build_hasher,
        })
    }

    /// Returns a reference to the value for `key`, marking the entry as
    /// just used under its bucket's eviction policy.
    ///
    /// The key may be any borrowed form of the cache's key type, but
    /// `Hash` and `Eq` on the borrowed form _must_ match those for the
    /// key type.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.build_hasher.hash_one(key);
        let index = self.bucket_of(hash);
        let bucket = &mut self.buckets[index];

        match probe(bucket.slots(), hash, key) {
            Probe::Hit(slot) => {
                bucket.touch(slot);
                bucket.slot(slot).value()
            }
            Probe::Miss { .. } => None,
        }
    }

    /// Returns `true` if an entry for `key` is live.
    ///
    /// Unlike [`get`](Self::get), this never informs the bucket's
    /// invalidator, so membership tests do not disturb eviction order.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.build_hasher.hash_one(key);
        let bucket = &self.buckets[self.bucket_of(hash)];
        matches!(probe(bucket.slots(), hash, key), Probe::Hit(_))
    }

    /// Inserts or updates the entry for `key`.
    ///
    /// Returns the previous value when the key was already present and
    /// `None` when the entry is fresh. If the target bucket is full, one
    /// entry is evicted under the bucket's policy before the bucket is
    /// probed, so an update into a full bucket may first evict the very
    /// key being written and then insert it as a fresh entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalidation`] if the target bucket is full and
    /// its invalidator fails to free a slot. The cache is left unchanged.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = self.build_hasher.hash_one(&key);
        let index = self.bucket_of(hash);
        let bucket = &mut self.buckets[index];

        if bucket.is_full() {
            trace!("bucket {index} is full, invalidating one slot");
            if !bucket.invalidate() {
                warn!("invalidator freed no slot in full bucket {index}");
                return Err(Error::Invalidation {
                    bucket: index,
                    occupied: bucket.len(),
                });
            }
            self.len -= 1;
        }

        match probe(bucket.slots(), hash, &key) {
            Probe::Hit(slot) => {
                // Value-ordered policies re-rank on the touch that follows
                // the write.
                bucket.touch(slot);
                let previous = bucket.replace_value(slot, value);
                bucket.touch(slot);
                Ok(Some(previous))
            }
            Probe::Miss { vacant } => {
                let slot = vacant.expect("bucket with spare capacity has an unset slot");
                bucket.assign(slot, key, value, hash);
                bucket.touch(slot);
                self.len += 1;
                Ok(None)
            }
        }
    }

    /// Removes the entry for `key`, returning the stored value.
    ///
    /// The key may be any borrowed form of the cache's key type, but
    /// `Hash` and `Eq` on the borrowed form _must_ match those for the
    /// key type.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.build_hasher.hash_one(key);
        let index = self.bucket_of(hash);
        let bucket = &mut self.buckets[index];

        match probe(bucket.slots(), hash, key) {
            Probe::Hit(slot) => {
                self.len -= 1;
                bucket.remove(slot)
            }
            Probe::Miss { .. } => None,
        }
    }

    /// Discards every live entry.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        debug!("cleared {} entries", self.len);
        self.len = 0;
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }
}

enum Probe {
    Hit(usize),
    Miss { vacant: Option<usize> },
}

/// Walks every slot of a bucket at most once, starting at the hash's home
/// position and wrapping around. A miss reports the last unset slot seen
/// so the caller can insert there.
fn probe<K, V, Q>(slots: &[Slot<K, V>], hash: u64, key: &Q) -> Probe
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let ways = slots.len();
    let start = (hash % ways as u64) as usize;
    let mut vacant = None;

    for offset in 0..ways {
        let index = (start + offset) % ways;
        let slot = &slots[index];
        if slot.matches(hash, key) {
            return Probe::Hit(index);
        }
        if !slot.is_set() {
            vacant = Some(index);
        }
    }

    Probe::Miss { vacant }
}
