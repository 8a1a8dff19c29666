//! One-time magic tokens.
//!
//! A magic token is an opaque pre-shared secret bound server-side to a
//! username with a store-enforced TTL. It is consumed exactly once, via a
//! single atomic read-and-delete, so overlapping consumers can never both
//! observe the owner; expiry is passive via the backend TTL, there is no
//! sweep. The token is never re-derived from anything: losing it means
//! minting a new one.

use crate::kv::{KvError, KvStore};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Restricted, visually-unambiguous alphabet: no `0/O`, no `1/I/L`.
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const TOKEN_LENGTH: usize = 12;
const TOKEN_PREFIX: &str = "admin-tokens";

const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Clone)]
pub struct MagicTokens {
    kv: Arc<dyn KvStore>,
}

impl MagicTokens {
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(token: &str) -> String {
        format!("{TOKEN_PREFIX}:{token}")
    }

    /// Generate a fresh opaque token from the restricted alphabet.
    #[must_use]
    pub fn generate() -> String {
        let mut rng = rand::thread_rng();
        (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }

    /// Bind `token` to `username` for `ttl_seconds`.
    ///
    /// # Errors
    /// Returns an error if the store command fails.
    pub async fn put(&self, token: &str, username: &str, ttl_seconds: u64) -> Result<(), KvError> {
        self.kv.set_ex(&Self::key(token), username, ttl_seconds).await
    }

    /// Mint a new one-time token for `username`, valid for `ttl_minutes`.
    ///
    /// # Errors
    /// Returns an error if the store command fails.
    pub async fn issue(&self, username: &str, ttl_minutes: u64) -> Result<String, KvError> {
        let token = Self::generate();
        self.put(&token, username, ttl_minutes * SECONDS_PER_MINUTE)
            .await?;
        debug!("issued magic token for {username}");
        Ok(token)
    }

    /// Atomically read and destroy a token binding.
    ///
    /// Returns `None` if the token never existed, already expired, or was
    /// already consumed. Single-use holds under concurrency: the store's
    /// `GETDEL` guarantees at most one caller sees the owner.
    ///
    /// # Errors
    /// Returns an error if the store command fails.
    pub async fn consume(&self, token: &str) -> Result<Option<String>, KvError> {
        self.kv.getdel(&Self::key(token)).await
    }
}
