use crate::item::CacheItem;

use std::fmt;
use std::sync::Arc;

/// Describes the reason an entry was removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
  /// The entry was removed because the cache exceeded its memory budget.
  Capacity,
  /// The entry was displaced by a fresh insert for the same identity key.
  Displaced,
  /// The entry was manually evicted.
  Invalidated,
}

impl fmt::Display for EvictionReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionReason::Capacity => write!(f, "evicted due to capacity"),
      EvictionReason::Displaced => write!(f, "displaced by an insert for the same key"),
      EvictionReason::Invalidated => write!(f, "manually evicted"),
    }
  }
}

/// A listener that can be registered with the cache to receive
/// notifications when entries are removed.
///
/// The `on_evict` method is called with the key, value, and reason for
/// the removal. Callbacks run on the calling thread after the cache's
/// lock has been released, so a listener may call back into the cache.
pub trait EvictionListener<V: CacheItem>: Send + Sync {
  fn on_evict(&self, key: V::Key, state: Arc<V>, reason: EvictionReason);
}
