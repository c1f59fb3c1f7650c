// Error types for waycache.
//
// This module defines the errors the cache can report. Missing keys and
// empty-bucket invalidation stay in-band (`None` / `false`); only
// construction, the invalidator contract, and entry downcasts can fail.

use thiserror::Error;

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested geometry cannot hold a single entry.
    #[error("cache geometry must be at least 1x1 (got {sets} sets, {ways} ways)")]
    Configuration {
        /// The rejected number of sets.
        sets: usize,
        /// The rejected number of ways.
        ways: usize,
    },

    /// A full bucket's invalidator failed to yield a victim slot even
    /// though the bucket holds live entries.
    #[error("invalidator freed no slot in full bucket {bucket} ({occupied} occupied)")]
    Invalidation {
        /// The bucket whose invalidator broke its contract.
        bucket: usize,
        /// How many slots the bucket held at the time.
        occupied: usize,
    },

    /// An entry was downcast to a type other than its concrete type.
    #[error("entry is not a `{requested}`")]
    EntryType {
        /// Name of the type the caller requested.
        requested: &'static str,
    },
}
