mod common;

use common::TestState;
use larder_cache::{Cache, CacheBuilder, EvictionListener, EvictionReason};

use std::sync::{Arc, Mutex, OnceLock};

/// Records every eviction callback for later inspection.
struct Recorder {
  events: Arc<Mutex<Vec<(u32, EvictionReason)>>>,
}

impl EvictionListener<TestState> for Recorder {
  fn on_evict(&self, key: u32, _state: Arc<TestState>, reason: EvictionReason) {
    self.events.lock().unwrap().push((key, reason));
  }
}

fn recording_cache(capacity: u64) -> (Cache<TestState>, Arc<Mutex<Vec<(u32, EvictionReason)>>>) {
  let events = Arc::new(Mutex::new(Vec::new()));
  let cache = CacheBuilder::new()
    .capacity(capacity)
    .eviction_listener(Recorder {
      events: events.clone(),
    })
    .build()
    .unwrap();
  (cache, events)
}

#[test]
fn test_listener_reports_capacity_evictions() {
  let (cache, events) = recording_cache(200);
  cache.insert(TestState::new(1, 50));
  cache.insert(TestState::new(2, 50));

  let events = events.lock().unwrap();
  assert_eq!(*events, vec![(1, EvictionReason::Capacity)]);
}

#[test]
fn test_listener_reports_displacement_exactly_once() {
  let (cache, events) = recording_cache(1024);
  cache.insert(TestState::new(7, 50));
  cache.insert(TestState::new(7, 80));

  let events = events.lock().unwrap();
  assert_eq!(*events, vec![(7, EvictionReason::Displaced)]);
}

#[test]
fn test_listener_reports_manual_eviction() {
  let (cache, events) = recording_cache(1024);
  cache.insert(TestState::new(3, 50));
  cache.evict(&3);

  let events = events.lock().unwrap();
  assert_eq!(*events, vec![(3, EvictionReason::Invalidated)]);
}

#[test]
fn test_clear_delivers_no_callbacks() {
  let (cache, events) = recording_cache(1024);
  for key in 0..4 {
    cache.insert(TestState::new(key, 50));
  }
  cache.clear();

  assert!(events.lock().unwrap().is_empty());
}

/// A listener that calls back into the cache it observes.
struct Reentrant {
  cache: Arc<OnceLock<Cache<TestState>>>,
  observed_len: Arc<Mutex<Vec<usize>>>,
}

impl EvictionListener<TestState> for Reentrant {
  fn on_evict(&self, _key: u32, _state: Arc<TestState>, _reason: EvictionReason) {
    if let Some(cache) = self.cache.get() {
      // Callbacks run after the cache lock is released, so this must
      // not deadlock.
      self.observed_len.lock().unwrap().push(cache.len());
    }
  }
}

#[test]
fn test_listener_may_reenter_cache() {
  let handle = Arc::new(OnceLock::new());
  let observed_len = Arc::new(Mutex::new(Vec::new()));
  let cache = CacheBuilder::new()
    .capacity(200)
    .eviction_listener(Reentrant {
      cache: handle.clone(),
      observed_len: observed_len.clone(),
    })
    .build()
    .unwrap();
  handle.set(cache.clone()).ok();

  cache.insert(TestState::new(1, 50));
  cache.insert(TestState::new(2, 50)); // evicts key 1, callback re-enters

  assert_eq!(*observed_len.lock().unwrap(), vec![1]);
}
