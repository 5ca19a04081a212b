pub mod cache;
pub mod redis_cache;

pub use cache::{CacheService, CacheStore, InMemoryCache, NoopCache};
pub use redis_cache::RedisCache;
