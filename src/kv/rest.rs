//! Production adapter for the store's REST command protocol.
//!
//! Commands are posted as JSON arrays (`["SADD","admins","@lapsus"]`) to the
//! store base URL with a bearer token. The response carries either a
//! `result` field or a non-null `error` field; the latter and any transport
//! failure surface as [`KvError`]. There are no retries.

use crate::kv::{KvError, KvStore};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const KV_TIMEOUT_SECONDS: u64 = 10;

pub struct RestKv {
    base_url: String,
    token: SecretString,
    // Built lazily on first use; OnceCell guarantees a single client even
    // under concurrent first requests.
    client: OnceCell<Client>,
}

impl RestKv {
    #[must_use]
    pub fn new(base_url: &str, token: SecretString) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, KvError> {
        self.client.get_or_try_init(|| {
            debug!("creating kv client for {}", self.base_url);
            Client::builder()
                .user_agent(crate::APP_USER_AGENT)
                .timeout(Duration::from_secs(KV_TIMEOUT_SECONDS))
                .build()
                .map_err(KvError::Transport)
        })
    }

    /// Execute a raw store command.
    ///
    /// # Errors
    /// Returns an error if the transport fails or the store reports an error.
    #[instrument(skip(self), fields(command = parts.first().copied().unwrap_or("")))]
    pub async fn command(&self, parts: &[&str]) -> Result<Value, KvError> {
        let client = self.client()?;

        let response = client
            .post(&self.base_url)
            .bearer_auth(self.token.expose_secret())
            .json(&parts)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await?;

        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            return Err(KvError::Command(error.to_string()));
        }

        if !status.is_success() {
            return Err(KvError::Command(format!("store returned {status}")));
        }

        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }
}

fn as_string_array(result: Value) -> Result<Vec<String>, KvError> {
    match result {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| KvError::Protocol("non-string array member".to_string()))
            })
            .collect(),
        other => Err(KvError::Protocol(format!("expected array, got {other}"))),
    }
}

#[async_trait]
impl KvStore for RestKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let result = self.command(&["GET", key]).await?;
        Ok(result.as_str().map(str::to_string))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError> {
        let ttl = ttl_seconds.to_string();
        self.command(&["SET", key, value, "EX", &ttl]).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }

    async fn getdel(&self, key: &str) -> Result<Option<String>, KvError> {
        let result = self.command(&["GETDEL", key]).await?;
        Ok(result.as_str().map(str::to_string))
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), KvError> {
        self.command(&["SADD", key, member]).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), KvError> {
        self.command(&["SREM", key, member]).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, KvError> {
        let result = self.command(&["SMEMBERS", key]).await?;
        as_string_array(result)
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), KvError> {
        let mut parts = vec!["HSET", key];
        for (field, value) in fields {
            parts.push(field);
            parts.push(value);
        }
        self.command(&parts).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, KvError> {
        // The store answers HGETALL with a flat [field, value, ...] array.
        let flat = as_string_array(self.command(&["HGETALL", key]).await?)?;
        if flat.len() % 2 != 0 {
            return Err(KvError::Protocol("odd HGETALL reply length".to_string()));
        }

        let mut map = HashMap::with_capacity(flat.len() / 2);
        let mut items = flat.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            map.insert(field, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kv() -> RestKv {
        RestKv::new(
            "https://kv.example.test/",
            SecretString::from("token".to_string()),
        )
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(kv().base_url, "https://kv.example.test");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn client_is_built_once() {
        let kv = kv();
        let first = kv.client().unwrap() as *const Client;
        let second = kv.client().unwrap() as *const Client;
        assert_eq!(first, second);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn string_array_accepts_null_and_arrays() {
        assert!(as_string_array(Value::Null).unwrap().is_empty());
        assert_eq!(
            as_string_array(json!(["a", "b"])).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn string_array_rejects_scalars() {
        let result = as_string_array(json!(42));
        assert!(matches!(result, Err(KvError::Protocol(_))));
    }
}
