use crate::entry::CacheEntry;
use crate::item::CacheItem;
use crate::listener::{EvictionListener, EvictionReason};
use crate::metrics::Metrics;
use crate::registry::{CacheRegistry, ManagedCache};

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

/// Ties a cache to the registry it announced itself to, so the
/// registration can be withdrawn when the cache is dropped.
pub(crate) struct Registration {
  pub(crate) registry: Arc<dyn CacheRegistry>,
  pub(crate) id: u64,
}

/// The mutable core of the cache.
///
/// Every public operation mutates this state under the instance lock, so
/// ordering promotion, size accounting and eviction are observed as a
/// single atomic step from every caller's perspective.
pub(crate) struct CacheInner<V: CacheItem> {
  /// Identity key to entry. At most one entry per key.
  pub(crate) map: HashMap<V::Key, CacheEntry<V>>,
  /// Recency queue over the same keys: the front is the next eviction
  /// candidate, the back is the most recently inserted or read key.
  /// Promotion is remove-then-reinsert, O(n) in the entry count.
  pub(crate) order: VecDeque<V::Key>,
  /// Sum of the charged sizes of all entries currently in `map`.
  pub(crate) total_mem: u64,
  /// The configured memory ceiling.
  pub(crate) max_mem: u64,
  /// Entry-addressed operations since the last reset.
  pub(crate) access_count: u64,
  /// Inserts since construction, for the periodic occupancy log line.
  pub(crate) num_writes: u64,
}

impl<V: CacheItem> CacheInner<V> {
  pub(crate) fn new(max_mem: u64) -> Self {
    Self {
      map: HashMap::new(),
      order: VecDeque::new(),
      total_mem: 0,
      max_mem,
      access_count: 0,
      num_writes: 0,
    }
  }

  /// Moves the key to the fresh end of the recency queue.
  pub(crate) fn promote(&mut self, key: &V::Key) {
    if let Some(pos) = self.order.iter().position(|k| k == key) {
      if let Some(key) = self.order.remove(pos) {
        self.order.push_back(key);
      }
    }
  }

  /// Removes the entry for `key` from the map and the recency queue,
  /// subtracting its charged size from the running total.
  pub(crate) fn remove_entry(&mut self, key: &V::Key) -> Option<CacheEntry<V>> {
    let entry = self.map.remove(key)?;
    self.total_mem -= entry.size();
    if let Some(pos) = self.order.iter().position(|k| k == key) {
      self.order.remove(pos);
    }
    Some(entry)
  }

  /// Re-reads the footprint of the entry for `key`, keeping the running
  /// total in step. Returns false if the key is absent.
  pub(crate) fn refresh_entry(&mut self, key: &V::Key) -> bool {
    match self.map.get_mut(key) {
      Some(entry) => {
        self.total_mem -= entry.size();
        entry.recalc();
        self.total_mem += entry.size();
        true
      }
      None => false,
    }
  }

  /// Re-reads every entry's footprint and resets the running total to the
  /// recomputed sum, which is returned.
  pub(crate) fn recalc_all(&mut self) -> u64 {
    let mut total = 0;
    for entry in self.map.values_mut() {
      entry.recalc();
      total += entry.size();
    }
    self.total_mem = total;
    total
  }

  /// Evicts from the cold end of the recency queue until the budget is
  /// satisfied. A single entry larger than the budget is left in place:
  /// the loop never evicts the last remaining entry, so an oversized
  /// entry survives alone until a later insert displaces it or the
  /// bound is raised.
  pub(crate) fn shrink(&mut self) -> Vec<(V::Key, CacheEntry<V>)> {
    let mut victims = Vec::new();
    while self.total_mem > self.max_mem && self.map.len() > 1 {
      let Some(key) = self.order.pop_front() else {
        break;
      };
      if let Some(entry) = self.map.remove(&key) {
        self.total_mem -= entry.size();
        victims.push((key, entry));
      }
    }
    victims
  }
}

/// The internal, thread-safe core shared by all handles to one cache.
pub(crate) struct CacheShared<V: CacheItem> {
  pub(crate) inner: Mutex<CacheInner<V>>,
  pub(crate) metrics: Metrics,
  pub(crate) listener: Option<Arc<dyn EvictionListener<V>>>,
  pub(crate) registration: OnceCell<Registration>,
}

impl<V: CacheItem> CacheShared<V> {
  pub(crate) fn new(max_mem: u64, listener: Option<Arc<dyn EvictionListener<V>>>) -> Self {
    Self {
      inner: Mutex::new(CacheInner::new(max_mem)),
      metrics: Metrics::new(),
      listener,
      registration: OnceCell::new(),
    }
  }

  /// Delivers a removal notification, if a listener is configured.
  /// Must be called after the instance lock has been released.
  pub(crate) fn notify(&self, key: V::Key, state: Arc<V>, reason: EvictionReason) {
    if let Some(listener) = &self.listener {
      listener.on_evict(key, state, reason);
    }
  }

  /// Updates the memory ceiling and immediately evicts down to it.
  pub(crate) fn resize(&self, bytes: u64) {
    let victims;
    {
      let mut guard = self.inner.lock();
      let inner = &mut *guard;
      inner.max_mem = bytes;
      victims = inner.shrink();
      self
        .metrics
        .evicted_by_capacity
        .fetch_add(victims.len() as u64, Ordering::Relaxed);
      self.metrics.current_mem.store(inner.total_mem, Ordering::Relaxed);
    }
    for (key, entry) in victims {
      self.notify(key, entry.into_state(), EvictionReason::Capacity);
    }
  }
}

impl<V: CacheItem> fmt::Debug for CacheShared<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.inner.lock();
    f.debug_struct("CacheShared")
      .field("len", &inner.map.len())
      .field("total_mem", &inner.total_mem)
      .field("max_mem", &inner.max_mem)
      .finish_non_exhaustive()
  }
}

impl<V: CacheItem> ManagedCache for CacheShared<V> {
  fn memory_used(&self) -> u64 {
    self.inner.lock().total_mem
  }

  fn max_memory(&self) -> u64 {
    self.inner.lock().max_mem
  }

  fn set_max_memory(&self, bytes: u64) {
    self.resize(bytes);
  }

  fn access_count(&self) -> u64 {
    self.inner.lock().access_count
  }

  fn reset_access_count(&self) {
    self.inner.lock().access_count = 0;
  }
}

impl<V: CacheItem> Drop for CacheShared<V> {
  fn drop(&mut self) {
    if let Some(registration) = self.registration.get() {
      registration.registry.deregister(registration.id);
    }
  }
}
