use std::sync::{Arc, Weak};

use ahash::{HashMap, HashMapExt};
use parking_lot::Mutex;

/// The smallest budget `rebalance` will hand to any single cache.
pub const MIN_CACHE_BUDGET: u64 = 128 * 1024;

/// The control surface a cache exposes to its registry.
///
/// These are the calls an external monitor needs to observe and steer a
/// cache's memory use without knowing anything about its contents.
pub trait ManagedCache: Send + Sync {
  /// The memory currently accounted for, in bytes. A cheap read of the
  /// incrementally maintained total, not a recomputation.
  fn memory_used(&self) -> u64;

  /// The current memory ceiling, in bytes.
  fn max_memory(&self) -> u64;

  /// Updates the memory ceiling and immediately evicts down to it.
  fn set_max_memory(&self, bytes: u64);

  /// The number of entry-addressed operations since the last reset.
  fn access_count(&self) -> u64;

  /// Resets the access counter to zero.
  fn reset_access_count(&self);
}

/// A registration sink caches announce themselves to at construction time.
///
/// Injected into [`CacheBuilder`](crate::CacheBuilder) rather than reached
/// through global state, so caches can be tested in isolation. A cache
/// registers when it is built and deregisters when its last handle drops.
pub trait CacheRegistry: Send + Sync {
  /// Registers a cache and returns an id to deregister it with later.
  fn register(&self, cache: Weak<dyn ManagedCache>) -> u64;

  /// Withdraws a registration. Unknown ids are ignored.
  fn deregister(&self, id: u64);
}

struct RegistryInner {
  next_id: u64,
  caches: HashMap<u64, Weak<dyn ManagedCache>>,
}

/// The provided [`CacheRegistry`] implementation: tracks live caches by
/// weak handle and offers cross-cache memory monitoring and control.
pub struct Registry {
  inner: Mutex<RegistryInner>,
}

impl Registry {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(RegistryInner {
        next_id: 0,
        caches: HashMap::new(),
      }),
    }
  }

  /// Returns the live caches, pruning any whose last handle has dropped.
  fn live(&self) -> Vec<Arc<dyn ManagedCache>> {
    let mut inner = self.inner.lock();
    let mut live = Vec::with_capacity(inner.caches.len());
    inner.caches.retain(|_, cache| match cache.upgrade() {
      Some(cache) => {
        live.push(cache);
        true
      }
      None => false,
    });
    live
  }

  /// The number of currently live registered caches.
  pub fn len(&self) -> usize {
    self.live().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Sums the accounted memory of every live registered cache.
  pub fn total_memory_used(&self) -> u64 {
    self.live().iter().map(|cache| cache.memory_used()).sum()
  }

  /// Redistributes `total_budget` bytes across the live caches,
  /// proportionally to each cache's share of the accesses recorded since
  /// the previous rebalance, with a floor of [`MIN_CACHE_BUDGET`] per
  /// cache. Access counters are reset afterwards so the next cycle
  /// reflects fresh activity.
  ///
  /// Each cache shrinks itself inside its own `set_max_memory` call; the
  /// registry never touches entries directly.
  pub fn rebalance(&self, total_budget: u64) {
    // Snapshot the live caches first so no registry lock is held while
    // calling into them.
    let caches = self.live();
    if caches.is_empty() {
      return;
    }

    let counts: Vec<u64> = caches.iter().map(|cache| cache.access_count()).collect();
    let total_accesses: u64 = counts.iter().sum();

    for (cache, count) in caches.iter().zip(counts) {
      let share = if total_accesses == 0 {
        total_budget / caches.len() as u64
      } else {
        ((total_budget as u128 * count as u128) / total_accesses as u128) as u64
      };
      cache.set_max_memory(share.max(MIN_CACHE_BUDGET));
      cache.reset_access_count();
    }
  }
}

impl Default for Registry {
  fn default() -> Self {
    Self::new()
  }
}

impl CacheRegistry for Registry {
  fn register(&self, cache: Weak<dyn ManagedCache>) -> u64 {
    let mut inner = self.inner.lock();
    let id = inner.next_id;
    inner.next_id += 1;
    inner.caches.insert(id, cache);
    id
  }

  fn deregister(&self, id: u64) {
    self.inner.lock().caches.remove(&id);
  }
}
