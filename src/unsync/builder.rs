use super::{Cache, InvalidatorFactory};
use crate::eviction::Invalidator;
use crate::Result;

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

/// Builds a [`Cache`] with a chosen geometry, eviction policy, and hasher.
///
/// # Examples
///
/// ```rust
/// use waycache::eviction::Mru;
/// use waycache::unsync::Cache;
///
/// let mut cache = Cache::builder(8, 4)
///     .invalidator(|ways| Box::new(Mru::new(ways)))
///     .build()?;
///
/// cache.put(0, "zero")?;
/// assert_eq!(cache.get(&0), Some(&"zero"));
/// # Ok::<(), waycache::Error>(())
/// ```
#[must_use]
pub struct CacheBuilder<K, V> {
    sets: usize,
    ways: usize,
    factory: Option<InvalidatorFactory<K, V>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash,
{
    /// Constructs a builder for a cache of `sets` buckets holding `ways`
    /// slots each.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            sets,
            ways,
            factory: None,
        }
    }

    /// Sets the factory that supplies each bucket's eviction policy.
    ///
    /// The factory runs once per bucket at construction time and receives
    /// the bucket's slot count; buckets never share an invalidator. When
    /// no factory is supplied, every bucket evicts least recently used.
    pub fn invalidator<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn Invalidator<K, V>> + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Builds a `Cache<K, V>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if
    /// `sets` or `ways` is zero.
    pub fn build(self) -> Result<Cache<K, V>> {
        let build_hasher = RandomState::default();
        Cache::with_everything(self.sets, self.ways, self.factory, build_hasher)
    }

    /// Builds a `Cache<K, V, S>` that hashes keys with the given `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if
    /// `sets` or `ways` is zero.
    pub fn build_with_hasher<S>(self, hasher: S) -> Result<Cache<K, V, S>>
    where
        S: BuildHasher,
    {
        Cache::with_everything(self.sets, self.ways, self.factory, hasher)
    }
}
