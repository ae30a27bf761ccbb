use crate::error::BuildError;
use crate::item::CacheItem;
use crate::listener::EvictionListener;
use crate::registry::{CacheRegistry, ManagedCache};
use crate::shared::{CacheShared, Registration};
use crate::sync::Cache;

use std::fmt;
use std::sync::{Arc, Weak};

/// Default memory budget: 4 MiB.
pub const DEFAULT_MAX_MEM: u64 = 4 * 1024 * 1024;

/// A builder for creating [`Cache`] instances.
pub struct CacheBuilder<V: CacheItem> {
  capacity: u64,
  listener: Option<Arc<dyn EvictionListener<V>>>,
  registry: Option<Arc<dyn CacheRegistry>>,
}

// Manual Debug implementation for CacheBuilder.
impl<V: CacheItem> fmt::Debug for CacheBuilder<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("has_listener", &self.listener.is_some())
      .field("has_registry", &self.registry.is_some())
      .finish()
  }
}

impl<V: CacheItem + 'static> CacheBuilder<V> {
  pub fn new() -> Self {
    Self {
      capacity: DEFAULT_MAX_MEM,
      listener: None,
      registry: None,
    }
  }

  /// Sets the memory budget, in bytes.
  pub fn capacity(mut self, bytes: u64) -> Self {
    self.capacity = bytes;
    self
  }

  /// Sets the eviction listener for the cache.
  pub fn eviction_listener<L>(mut self, listener: L) -> Self
  where
    L: EvictionListener<V> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Sets the registry the cache announces itself to once built.
  /// The cache deregisters itself again when its last handle drops.
  pub fn registry(mut self, registry: Arc<dyn CacheRegistry>) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Builds the cache, registering it with the configured registry.
  pub fn build(self) -> Result<Cache<V>, BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }

    let shared = Arc::new(CacheShared::new(self.capacity, self.listener));

    if let Some(registry) = self.registry {
      let shared_dyn: Arc<dyn ManagedCache> = shared.clone();
      let handle: Weak<dyn ManagedCache> = Arc::downgrade(&shared_dyn);
      let id = registry.register(handle);
      let _ = shared.registration.set(Registration { registry, id });
    }

    Ok(Cache { shared })
  }
}

impl<V: CacheItem + 'static> Default for CacheBuilder<V> {
  fn default() -> Self {
    Self::new()
  }
}
