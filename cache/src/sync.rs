use crate::entry::CacheEntry;
use crate::item::CacheItem;
use crate::listener::EvictionReason;
use crate::shared::CacheShared;
use crate::MetricsSnapshot;

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ahash::HashSet;
use log::{debug, warn};

/// How often the insert path reports occupancy at debug level.
const WRITE_LOG_INTERVAL: u64 = 10_000;

/// A thread-safe, memory-bounded cache of item states.
///
/// Entries are admitted until the estimated memory budget is exhausted,
/// then the least-recently-touched entries are evicted until the budget is
/// satisfied again. Reads promote the touched entry to the freshest
/// position; eviction always takes the oldest.
///
/// All operations serialize through one exclusive lock per cache instance.
/// Promotion and removal scan the recency queue, so entry-addressed
/// operations are O(n) in the entry count; this trades throughput for a
/// single structure that keeps ordering, accounting and uniqueness
/// consistent under concurrent use.
///
/// Handles are cheap to clone and share one underlying cache.
pub struct Cache<V: CacheItem> {
  pub(crate) shared: Arc<CacheShared<V>>,
}

impl<V: CacheItem> Clone for Cache<V> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<V: CacheItem> Cache<V> {
  /// Returns true if an entry for `key` is present.
  /// Does not change the entry's position in the recency order.
  pub fn contains(&self, key: &V::Key) -> bool {
    let mut inner = self.shared.inner.lock();
    inner.access_count += 1;
    inner.map.contains_key(key)
  }

  /// Fetches the state cached under `key`, promoting it to the freshest
  /// position. Returns `None` on a miss.
  ///
  /// The returned `Arc` shares ownership with the cache: the state is not
  /// cloned. A caller that mutates it through interior mutability must
  /// call [`refresh`](Cache::refresh) afterwards, or the charged size
  /// goes stale until the next [`measured_memory`](Cache::measured_memory).
  pub fn get(&self, key: &V::Key) -> Option<Arc<V>> {
    let mut guard = self.shared.inner.lock();
    let inner = &mut *guard;
    inner.access_count += 1;

    let state = inner.map.get(key).map(|entry| entry.state());
    match state {
      Some(state) => {
        // 'touch' the entry by reinserting it at the fresh end.
        inner.promote(key);
        self.shared.metrics.hits.fetch_add(1, Ordering::Relaxed);
        Some(state)
      }
      None => {
        self.shared.metrics.misses.fetch_add(1, Ordering::Relaxed);
        None
      }
    }
  }

  /// Inserts `state` under its own identity key, at the freshest position.
  ///
  /// If an entry for the key is already present it is evicted first and
  /// reported once: a warning on the logging boundary plus an
  /// [`EvictionReason::Displaced`] listener callback. This is a policy
  /// outcome, not an error.
  ///
  /// After the insert the shrink loop evicts from the oldest position
  /// until the budget is satisfied. A single entry larger than the whole
  /// budget is tolerated until a later insert displaces it.
  pub fn insert(&self, state: V) {
    let key = state.key();
    let entry = CacheEntry::new(state);

    let displaced;
    let victims;
    let occupancy;
    {
      let mut guard = self.shared.inner.lock();
      let inner = &mut *guard;
      inner.access_count += 1;

      displaced = inner
        .remove_entry(&key)
        .map(|old| (key.clone(), old.into_state()));
      if displaced.is_some() {
        self.shared.metrics.displacements.fetch_add(1, Ordering::Relaxed);
      }

      inner.total_mem += entry.size();
      self
        .shared
        .metrics
        .total_mem_added
        .fetch_add(entry.size(), Ordering::Relaxed);
      inner.map.insert(key.clone(), entry);
      inner.order.push_back(key);

      victims = inner.shrink();

      occupancy = if inner.num_writes % WRITE_LOG_INTERVAL == 0 {
        Some((inner.map.len(), inner.total_mem, inner.max_mem))
      } else {
        None
      };
      inner.num_writes += 1;

      self.shared.metrics.inserts.fetch_add(1, Ordering::Relaxed);
      self
        .shared
        .metrics
        .evicted_by_capacity
        .fetch_add(victims.len() as u64, Ordering::Relaxed);
      self.shared.metrics.current_mem.store(inner.total_mem, Ordering::Relaxed);
    }

    // Reporting happens after the lock is released so a listener may call
    // back into the cache.
    if let Some((key, old)) = displaced {
      warn!("overwriting cached entry {:?}", key);
      self.shared.notify(key, old, EvictionReason::Displaced);
    }
    for (key, victim) in victims {
      self.shared.notify(key, victim.into_state(), EvictionReason::Capacity);
    }
    if let Some((len, total_mem, max_mem)) = occupancy {
      debug!("cache size={}, {}/{} bytes", len, total_mem, max_mem);
    }
  }

  /// Re-reads the footprint of the entry for `key` and re-accounts it.
  ///
  /// Call this after mutating a state obtained from [`get`](Cache::get).
  /// Does not change the entry's position in the recency order. A no-op
  /// for absent keys.
  pub fn refresh(&self, key: &V::Key) {
    let mut guard = self.shared.inner.lock();
    let inner = &mut *guard;
    inner.access_count += 1;
    if inner.refresh_entry(key) {
      self.shared.metrics.current_mem.store(inner.total_mem, Ordering::Relaxed);
    }
  }

  /// Removes the entry for `key`, if present. A no-op for absent keys.
  pub fn evict(&self, key: &V::Key) {
    let removed;
    {
      let mut guard = self.shared.inner.lock();
      let inner = &mut *guard;
      inner.access_count += 1;
      removed = inner.remove_entry(key);
      if removed.is_some() {
        self.shared.metrics.invalidations.fetch_add(1, Ordering::Relaxed);
        self.shared.metrics.current_mem.store(inner.total_mem, Ordering::Relaxed);
      }
    }
    if let Some(entry) = removed {
      self
        .shared
        .notify(key.clone(), entry.into_state(), EvictionReason::Invalidated);
    }
  }

  /// Removes every entry and resets the accounted memory to zero.
  /// No per-entry listener callbacks are delivered.
  pub fn clear(&self) {
    let mut inner = self.shared.inner.lock();
    inner.map.clear();
    inner.order.clear();
    inner.total_mem = 0;
    self.shared.metrics.current_mem.store(0, Ordering::Relaxed);
  }

  /// The number of entries currently cached.
  pub fn len(&self) -> usize {
    self.shared.inner.lock().map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.shared.inner.lock().map.is_empty()
  }

  /// A snapshot of all identity keys. Carries no ordering guarantee.
  pub fn keys(&self) -> HashSet<V::Key> {
    let inner = self.shared.inner.lock();
    inner.map.keys().cloned().collect()
  }

  /// A snapshot of all cached states, oldest to freshest.
  pub fn values(&self) -> Vec<Arc<V>> {
    let inner = self.shared.inner.lock();
    inner
      .order
      .iter()
      .filter_map(|key| inner.map.get(key).map(|entry| entry.state()))
      .collect()
  }

  /// Re-reads every entry's footprint, resets the accounted total to the
  /// recomputed sum, and returns it.
  ///
  /// This is the authoritative figure after cached states have been
  /// mutated externally without a [`refresh`](Cache::refresh). The full
  /// recompute runs atomically with respect to all other operations.
  pub fn measured_memory(&self) -> u64 {
    let mut inner = self.shared.inner.lock();
    let total = inner.recalc_all();
    self.shared.metrics.current_mem.store(total, Ordering::Relaxed);
    total
  }

  /// The memory currently accounted for, in bytes. A cheap read of the
  /// incrementally maintained total; see
  /// [`measured_memory`](Cache::measured_memory) for the recomputing
  /// variant.
  pub fn memory_used(&self) -> u64 {
    self.shared.inner.lock().total_mem
  }

  /// The current memory ceiling, in bytes.
  pub fn capacity(&self) -> u64 {
    self.shared.inner.lock().max_mem
  }

  /// Updates the memory ceiling and immediately evicts down to it.
  pub fn set_capacity(&self, bytes: u64) {
    self.shared.resize(bytes);
  }

  /// The number of entry-addressed operations (`contains`, `get`,
  /// `insert`, `refresh`, `evict`, hits and misses alike) since the last
  /// reset.
  pub fn access_count(&self) -> u64 {
    self.shared.inner.lock().access_count
  }

  pub fn reset_access_count(&self) {
    self.shared.inner.lock().access_count = 0;
  }

  /// A point-in-time snapshot of the cache's metrics.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}

impl<V: CacheItem> fmt::Debug for Cache<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.shared.inner.lock();
    f.debug_struct("Cache")
      .field("len", &inner.map.len())
      .field("memory_used", &inner.total_mem)
      .field("capacity", &inner.max_mem)
      .finish()
  }
}
