//! A memory-bounded, access-ordered cache for item states loaded from
//! durable storage.
//!
//! The cache admits entries until an estimated memory budget is exhausted,
//! then evicts the least-recently-touched entries until the budget is
//! satisfied again. It exists to cut redundant loads in a persistence
//! layer and to serialize concurrent access to one logical object set.
//!
//! # Features
//! - **Memory-aware eviction**: entries are charged `64 bytes + the item's
//!   own footprint estimate`; the shrink loop evicts from the oldest
//!   position until the budget holds.
//! - **Access-order LRU**: reads promote an entry to the freshest
//!   position via remove-then-reinsert on a recency queue.
//! - **Non-Clone support**: states are stored in an `Arc<V>`, avoiding
//!   `V: Clone` bounds; callers share ownership with the cache.
//! - **Registry integration**: caches announce themselves to an injected
//!   [`CacheRegistry`] for cross-cache memory monitoring and control.
//! - **Observability**: eviction listener callbacks plus detailed metrics.
//!
//! Sizes are caller-supplied estimates, recomputed on demand; the cache
//! never measures memory itself and does not guarantee exact accounting.

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod item;
pub mod listener;
pub mod metrics;
pub mod registry;

// Internal, crate-only modules
mod entry;
mod shared;
mod sync;

// Re-export the primary user-facing types for convenience
pub use builder::{CacheBuilder, DEFAULT_MAX_MEM};
pub use entry::ENTRY_OVERHEAD;
pub use error::BuildError;
pub use item::CacheItem;
pub use listener::{EvictionListener, EvictionReason};
pub use metrics::MetricsSnapshot;
pub use registry::{CacheRegistry, ManagedCache, Registry, MIN_CACHE_BUDGET};
pub use sync::Cache;
