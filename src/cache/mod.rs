//! Request-scoped memoization.
//!
//! Services own one [`MemoryCache`] per memoized operation family, keyed by
//! the typed keys in [`keys`]. Tables are never shared between requests and
//! never expire; they are dropped together with the service that owns them.
//!
//! Lookups report `storefront_memory_cache_hit_total` and
//! `storefront_memory_cache_miss_total`, labelled with the table name.

mod keys;
pub(crate) mod lock;
mod memory;

pub use keys::{CategoryKey, PageSubject, UnitKey, UrlKey};
pub use memory::MemoryCache;
pub(crate) use memory::{METRIC_MEMORY_CACHE_HIT, METRIC_MEMORY_CACHE_MISS};
