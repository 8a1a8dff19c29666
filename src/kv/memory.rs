//! In-memory [`KvStore`] adapter for tests.
//!
//! Honors per-key TTLs with stored deadlines so expiry behavior can be
//! exercised without a real backend. Each primitive takes the single mutex
//! once, mirroring the backend guarantee that individual commands are
//! serialized.

use crate::kv::{KvError, KvStore};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Inner {
    strings: HashMap<String, (String, Instant)>,
    sets: HashMap<String, BTreeSet<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
}

#[derive(Default)]
pub struct MemoryKv {
    inner: Mutex<Inner>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, KvError> {
        self.inner
            .lock()
            .map_err(|_| KvError::Command("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut inner = self.lock()?;
        if let Some((_, deadline)) = inner.strings.get(key) {
            if *deadline <= Instant::now() {
                inner.strings.remove(key);
                return Ok(None);
            }
        }
        Ok(inner.strings.get(key).map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        self.lock()?
            .strings
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        self.lock()?.strings.remove(key);
        Ok(())
    }

    async fn getdel(&self, key: &str) -> Result<Option<String>, KvError> {
        // Remove under one lock so no other command can observe the value
        // between the read and the delete.
        match self.lock()?.strings.remove(key) {
            Some((value, deadline)) if deadline > Instant::now() => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), KvError> {
        self.lock()?
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), KvError> {
        if let Some(set) = self.lock()?.sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, KvError> {
        Ok(self
            .lock()?
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), KvError> {
        let mut inner = self.lock()?;
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        Ok(self.lock()?.hashes.get(key).cloned().unwrap_or_default())
    }
}
