pub mod result_cache;
pub mod store;

pub use result_cache::{CacheOutcome, OutcomeSource, ResultCache};
pub use store::{CacheEntry, CacheKey, CacheStore, CacheView, MemoryCacheStore};
