pub mod cache;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use cache::{Cache, CacheBackend, CacheKey, MemoryCache};
pub use memory::{CatalogSeed, MemoryStore};
pub use postgres::{create_pool, PgStore};
pub use redis::{create_redis_client, CacheWriterHandle, RedisCache};
pub use store::{BundleSource, CatalogStore};
