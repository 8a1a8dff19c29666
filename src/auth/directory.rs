//! Admin directory backed by one set key in the KV store.
//!
//! Membership is re-read on every authorization decision; there is no local
//! cache, so removing an admin takes effect on their next request. The
//! directory never special-cases the configured super-admin: its elevated
//! privileges come from a configuration comparison, not from membership.

use crate::kv::{KvError, KvStore};
use std::sync::Arc;
use tracing::info;

const ADMIN_SET: &str = "admins";

#[derive(Clone)]
pub struct AdminDirectory {
    kv: Arc<dyn KvStore>,
    super_admin: String,
}

impl AdminDirectory {
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>, super_admin: &str) -> Self {
        Self {
            kv,
            super_admin: super_admin.to_string(),
        }
    }

    /// Current membership.
    ///
    /// # Errors
    /// Returns an error if the store command fails.
    pub async fn list(&self) -> Result<Vec<String>, KvError> {
        self.kv.smembers(ADMIN_SET).await
    }

    /// Add a username and return the updated membership. Idempotent.
    ///
    /// # Errors
    /// Returns an error if a store command fails.
    pub async fn add(&self, username: &str) -> Result<Vec<String>, KvError> {
        self.kv.sadd(ADMIN_SET, username).await?;
        self.list().await
    }

    /// Remove a username and return the updated membership. Idempotent,
    /// including for the configured super-admin.
    ///
    /// # Errors
    /// Returns an error if a store command fails.
    pub async fn remove(&self, username: &str) -> Result<Vec<String>, KvError> {
        self.kv.srem(ADMIN_SET, username).await?;
        self.list().await
    }

    /// Membership test.
    ///
    /// # Errors
    /// Returns an error if the store command fails.
    pub async fn is_admin(&self, username: &str) -> Result<bool, KvError> {
        Ok(self.list().await?.iter().any(|admin| admin == username))
    }

    /// Seed the configured super-admin into the directory if absent.
    ///
    /// Must run before the service accepts authorization-dependent
    /// requests; calling it again is harmless.
    ///
    /// # Errors
    /// Returns an error if a store command fails.
    pub async fn ensure_default_admin(&self) -> Result<(), KvError> {
        if !self.is_admin(&self.super_admin).await? {
            self.kv.sadd(ADMIN_SET, &self.super_admin).await?;
            info!("seeded default admin {}", self.super_admin);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use anyhow::Result;

    fn directory() -> AdminDirectory {
        AdminDirectory::new(Arc::new(MemoryKv::new()), "@Lapsus00")
    }

    #[tokio::test]
    async fn add_and_remove_drive_membership() -> Result<()> {
        let directory = directory();
        assert!(!directory.is_admin("@mario").await?);

        let admins = directory.add("@mario").await?;
        assert!(admins.contains(&"@mario".to_string()));
        assert!(directory.is_admin("@mario").await?);

        let admins = directory.remove("@mario").await?;
        assert!(!admins.contains(&"@mario".to_string()));
        assert!(!directory.is_admin("@mario").await?);
        Ok(())
    }

    #[tokio::test]
    async fn add_and_remove_are_idempotent() -> Result<()> {
        let directory = directory();
        directory.add("@mario").await?;
        let admins = directory.add("@mario").await?;
        assert_eq!(
            admins.iter().filter(|name| *name == "@mario").count(),
            1
        );

        directory.remove("@nobody").await?;
        Ok(())
    }

    #[tokio::test]
    async fn ensure_default_admin_is_idempotent() -> Result<()> {
        let directory = directory();
        directory.ensure_default_admin().await?;
        directory.ensure_default_admin().await?;

        let admins = directory.list().await?;
        assert_eq!(
            admins.iter().filter(|name| *name == "@Lapsus00").count(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn super_admin_can_be_removed_from_directory() -> Result<()> {
        // No special guard here: super-admin privileges are a config
        // comparison, not a membership lookup. See guards tests.
        let directory = directory();
        directory.ensure_default_admin().await?;
        directory.remove("@Lapsus00").await?;
        assert!(!directory.is_admin("@Lapsus00").await?);
        Ok(())
    }
}
