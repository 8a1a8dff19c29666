//! Narrow capability interface over the remote key-value store.
//!
//! The store is the single source of truth for admin membership and pending
//! magic tokens. Only the primitives the service actually relies on are
//! exposed; atomicity of each primitive is delegated to the backend, which
//! serializes conflicting commands against the same key.

pub mod memory;
pub mod rest;

pub use self::memory::MemoryKv;
pub use self::rest::RestKv;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("kv transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("kv command failed: {0}")]
    Command(String),
    #[error("unexpected kv response: {0}")]
    Protocol(String),
}

/// Atomic primitives of the backing store.
///
/// One production adapter ([`RestKv`]) speaks the store's REST command
/// protocol; [`MemoryKv`] backs the test suite. Callers never retry: a
/// failed command surfaces immediately as [`KvError`].
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// `SET key value EX ttl_seconds`; the binding disappears once the TTL elapses.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError>;

    async fn del(&self, key: &str) -> Result<(), KvError>;

    /// Atomically read and delete a key in one command; `None` if absent.
    async fn getdel(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Idempotent set add.
    async fn sadd(&self, key: &str, member: &str) -> Result<(), KvError>;

    /// Idempotent set remove; removing a non-member is a no-op.
    async fn srem(&self, key: &str, member: &str) -> Result<(), KvError>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>, KvError>;

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), KvError>;

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError>;
}
