pub mod dashmap_jti_store;
pub mod hashmap_session_registry;
pub mod postgres_session_registry;
pub mod redis_jti_store;
pub mod redis_session_registry;
