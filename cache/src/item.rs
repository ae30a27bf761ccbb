use std::fmt;
use std::hash::Hash;

/// The contract a cached value must satisfy: a stable identity and an
/// on-demand estimate of its own memory footprint.
///
/// The cache never interprets the value beyond these two calls. Values are
/// typically item states loaded from durable storage by a surrounding
/// persistence layer.
pub trait CacheItem: Send + Sync {
  /// The identity key used to locate an entry.
  ///
  /// The key must be stable for the lifetime of the value. An
  /// implementation that returns different keys across calls is a
  /// precondition violation the cache does not detect.
  type Key: Eq + Hash + Clone + Send + Sync + fmt::Debug;

  /// Returns the identity key of this value.
  fn key(&self) -> Self::Key;

  /// Returns a rough estimate of the value's in-memory size, in bytes.
  ///
  /// The estimate is recomputed on demand, never measured. The cache
  /// caches the most recent result per entry and re-reads it on
  /// [`refresh`](crate::Cache::refresh) and
  /// [`measured_memory`](crate::Cache::measured_memory).
  fn estimated_size(&self) -> u64;
}
