//! Store implementations.
//!
//! In-memory stores back the single-process default and double as test
//! fakes; the Redis stores give the same trait seams a distributed backing.

pub mod csrf_memory;
pub mod csrf_redis;
pub mod session_memory;
pub mod session_redis;

pub use csrf_memory::InMemoryCsrfTokenStore;
pub use csrf_redis::RedisCsrfTokenStore;
pub use session_memory::InMemorySessionStore;
pub use session_redis::RedisSessionStore;
