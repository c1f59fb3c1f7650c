#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Waycache is a lightweight, in-memory, N-way set-associative cache for
//! single threaded applications.
//!
//! A cache is constructed as `sets × ways`: every key hashes to one of
//! `sets` buckets, and each bucket stores at most `ways` entries in slots
//! that are allocated once and reused for the cache's lifetime. When a
//! bucket overflows, its *invalidator* (the bucket's eviction policy)
//! picks one entry to drop. Eviction is strictly per bucket; entries
//! never spill into neighboring buckets, so every operation is bounded by
//! the bucket size regardless of the cache's total capacity.
//!
//! # Features
//!
//! - Fixed capacity chosen at construction: at most `sets × ways` live
//!   entries, with no allocation on the `get`/`put` hot path.
//! - Three eviction policies behind one trait: least recently used (the
//!   default), most recently used, and smallest value. Custom policies
//!   plug in through [`eviction::Invalidator`].
//! - Swappable key hashing through `BuildHasher`, like the standard
//!   library's `HashMap`.
//!
//! # Examples
//!
//! ```rust
//! use waycache::unsync::Cache;
//!
//! // Four buckets of two slots each.
//! let mut cache = Cache::new(4, 2)?;
//!
//! cache.put("a", 1)?;
//! cache.put("b", 2)?;
//!
//! assert_eq!(cache.get(&"a"), Some(&1));
//! assert_eq!(cache.len(), 2);
//!
//! cache.remove(&"b");
//! assert!(!cache.contains_key(&"b"));
//! # Ok::<(), waycache::Error>(())
//! ```
//!
//! The cache is *not* thread-safe; callers that share one across threads
//! must serialize access externally.
//!
//! # Minimum Supported Rust Version
//!
//! This crate's minimum supported Rust version (MSRV) is 1.76.0.
//! Increasing the MSRV is _not_ considered a semver-breaking change.

pub(crate) mod common;
mod error;
pub mod eviction;
mod policy;
pub mod unsync;

pub use error::{Error, Result};
pub use policy::Policy;
