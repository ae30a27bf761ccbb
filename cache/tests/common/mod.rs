#![allow(dead_code)]

use larder_cache::{Cache, CacheBuilder, CacheItem, ENTRY_OVERHEAD};

use std::sync::atomic::{AtomicU64, Ordering};

/// An item state with a controllable reported footprint, standing in for
/// the opaque objects a persistence layer would load from storage.
pub struct TestState {
  key: u32,
  footprint: AtomicU64,
}

impl TestState {
  pub fn new(key: u32, footprint: u64) -> Self {
    Self {
      key,
      footprint: AtomicU64::new(footprint),
    }
  }

  /// Changes the footprint the state reports, simulating an external
  /// mutation of a cached object.
  pub fn set_footprint(&self, bytes: u64) {
    self.footprint.store(bytes, Ordering::Relaxed);
  }
}

impl CacheItem for TestState {
  type Key = u32;

  fn key(&self) -> u32 {
    self.key
  }

  fn estimated_size(&self) -> u64 {
    self.footprint.load(Ordering::Relaxed)
  }
}

// Helper to build a cache for testing purposes.
pub fn build_test_cache(capacity: u64) -> Cache<TestState> {
  CacheBuilder::new().capacity(capacity).build().unwrap()
}

/// The size the cache charges for an entry with the given footprint.
pub fn entry_size(footprint: u64) -> u64 {
  ENTRY_OVERHEAD + footprint
}
