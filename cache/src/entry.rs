use crate::item::CacheItem;

use std::fmt;
use std::sync::Arc;

/// Fixed per-entry bookkeeping cost, in bytes, added on top of the item's
/// own footprint estimate. Part of the eviction trigger point: an entry
/// accounts for `ENTRY_OVERHEAD + estimated_size()` against the budget.
pub const ENTRY_OVERHEAD: u64 = 64;

/// A container for a value in the cache, holding its cached size estimate.
pub(crate) struct CacheEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  state: Arc<V>,
  /// The size charged against the memory budget, refreshed by `recalc`.
  size: u64,
}

impl<V: CacheItem> CacheEntry<V> {
  /// Creates a new `CacheEntry`, reading the item's footprint once.
  pub(crate) fn new(state: V) -> Self {
    let size = ENTRY_OVERHEAD + state.estimated_size();
    Self {
      state: Arc::new(state),
      size,
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn state(&self) -> Arc<V> {
    self.state.clone()
  }

  /// Consumes the entry, returning the value.
  #[inline]
  pub(crate) fn into_state(self) -> Arc<V> {
    self.state
  }

  /// Returns the size currently charged for this entry.
  #[inline]
  pub(crate) fn size(&self) -> u64 {
    self.size
  }

  /// Re-reads the item's footprint and updates the charged size.
  /// Does not change the entry's identity or its position in the order.
  pub(crate) fn recalc(&mut self) {
    self.size = ENTRY_OVERHEAD + self.state.estimated_size();
  }
}

impl<V: CacheItem> fmt::Debug for CacheEntry<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheEntry")
      .field("key", &self.state.key())
      .field("size", &self.size)
      .finish()
  }
}
