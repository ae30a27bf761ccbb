use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use larder_cache::{CacheBuilder, CacheItem};

/// A minimal item state for benchmarking; the footprint is a plain
/// number, so no allocation happens per entry beyond the state itself.
struct BenchState {
  key: u64,
  footprint: u64,
}

impl CacheItem for BenchState {
  type Key = u64;

  fn key(&self) -> u64 {
    self.key
  }

  fn estimated_size(&self) -> u64 {
    self.footprint
  }
}

fn bench_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("insert");
  group.throughput(Throughput::Elements(1));

  // A tight budget so every insert also pays for one eviction once the
  // cache warms up.
  group.bench_function("insert_evicting", |b| {
    let cache = CacheBuilder::<BenchState>::new()
      .capacity(64 * 1024)
      .build()
      .unwrap();
    let mut key = 0u64;
    b.iter(|| {
      cache.insert(BenchState {
        key: black_box(key),
        footprint: 64,
      });
      key = key.wrapping_add(1);
    });
  });

  group.finish();
}

fn bench_get(c: &mut Criterion) {
  let mut group = c.benchmark_group("get");
  group.throughput(Throughput::Elements(1));

  group.bench_function("get_hit", |b| {
    let cache = CacheBuilder::<BenchState>::new()
      .capacity(1 << 20)
      .build()
      .unwrap();
    for key in 0..1024 {
      cache.insert(BenchState { key, footprint: 64 });
    }
    let mut key = 0u64;
    b.iter(|| {
      let state = cache.get(&black_box(key % 1024));
      key = key.wrapping_add(1);
      state
    });
  });

  group.bench_function("get_miss", |b| {
    let cache = CacheBuilder::<BenchState>::new()
      .capacity(1 << 20)
      .build()
      .unwrap();
    for key in 0..1024 {
      cache.insert(BenchState { key, footprint: 64 });
    }
    b.iter(|| cache.get(&black_box(1_000_000)));
  });

  group.finish();
}

criterion_group!(benches, bench_insert, bench_get);
criterion_main!(benches);
