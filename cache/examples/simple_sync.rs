use larder_cache::{CacheBuilder, CacheItem, Registry};

use std::sync::Arc;

/// A toy item state: a blob of bytes with a numeric id.
struct BlobState {
  id: u64,
  payload: Vec<u8>,
}

impl CacheItem for BlobState {
  type Key = u64;

  fn key(&self) -> u64 {
    self.id
  }

  fn estimated_size(&self) -> u64 {
    self.payload.len() as u64
  }
}

fn main() {
  let registry = Arc::new(Registry::new());

  // Each 300-byte blob is charged 364 bytes (64 bytes of entry
  // overhead), so this budget holds three entries.
  let cache = CacheBuilder::default()
    .capacity(1200)
    .registry(registry.clone())
    .build()
    .expect("Failed to build cache");

  println!("Inserting three blobs of 300 bytes into a 1200-byte cache.");
  for id in 0..3 {
    cache.insert(BlobState {
      id,
      payload: vec![0u8; 300],
    });
  }

  // Reading blob 0 promotes it ahead of blob 1 in the eviction order.
  if cache.get(&0).is_some() {
    println!("Blob 0 promoted to the freshest position.");
  }

  // This overflows the budget; blob 1 is now the oldest and gets evicted.
  cache.insert(BlobState {
    id: 3,
    payload: vec![0u8; 300],
  });
  println!("Blob 1 still cached: {}", cache.contains(&1));
  println!("Blob 0 still cached: {}", cache.contains(&0));

  println!(
    "\nRegistry reports {} bytes in use across {} cache(s).",
    registry.total_memory_used(),
    registry.len()
  );

  println!("\nCache metrics: {:#?}", cache.metrics());
}
