//! Authorization guards used by every protected endpoint.
//!
//! `require_admin` checks directory membership; `require_super_admin`
//! compares the claim against the configured super-admin username and never
//! consults the directory. The two checks are deliberately asymmetric: a
//! super-admin removed from the directory still passes the super-admin
//! guard but fails the admin guard.

use crate::api::error::ApiError;
use crate::auth::{AdminDirectory, BearerSigner, Claims};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::debug;

/// Extract the bearer token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the presented bearer and return its claims.
///
/// # Errors
/// Returns `Unauthorized` if the bearer is missing, malformed, tampered
/// with, or expired.
pub fn verify_bearer(headers: &HeaderMap, signer: &BearerSigner) -> Result<Claims, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| ApiError::unauthorized("missing bearer"))?;

    signer.verify(token).map_err(|err| {
        debug!("bearer rejected: {err}");
        ApiError::unauthorized("invalid or expired bearer")
    })
}

/// Verify the bearer and require directory membership.
///
/// # Errors
/// Returns `Unauthorized` if the bearer is invalid or its username is not
/// currently in the admin directory; backend failures propagate as such.
pub async fn require_admin(
    headers: &HeaderMap,
    signer: &BearerSigner,
    directory: &AdminDirectory,
) -> Result<Claims, ApiError> {
    let claims = verify_bearer(headers, signer)?;
    if directory.is_admin(&claims.username).await? {
        Ok(claims)
    } else {
        Err(ApiError::unauthorized("not an admin"))
    }
}

/// Verify the bearer and require the configured super-admin username.
///
/// # Errors
/// Returns `Unauthorized` if the bearer is invalid or belongs to anyone
/// other than the configured super-admin.
pub fn require_super_admin(
    headers: &HeaderMap,
    signer: &BearerSigner,
    super_admin: &str,
) -> Result<Claims, ApiError> {
    let claims = verify_bearer(headers, signer)?;
    if claims.username == super_admin {
        Ok(claims)
    } else {
        Err(ApiError::unauthorized("super admin only"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use anyhow::Result;
    use axum::http::HeaderValue;
    use secrecy::SecretString;
    use std::sync::Arc;

    const SUPER_ADMIN: &str = "@Lapsus00";

    fn signer() -> BearerSigner {
        BearerSigner::new(SecretString::from("test-secret".to_string()), 30)
    }

    fn directory() -> AdminDirectory {
        AdminDirectory::new(Arc::new(MemoryKv::new()), SUPER_ADMIN)
    }

    fn headers_with_bearer(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        Ok(headers)
    }

    #[test]
    fn bearer_token_requires_the_scheme() -> Result<()> {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn require_admin_checks_directory_membership() -> Result<()> {
        let signer = signer();
        let directory = directory();
        let headers = headers_with_bearer(&signer.mint("@mario")?)?;

        assert!(require_admin(&headers, &signer, &directory).await.is_err());

        directory.add("@mario").await?;
        let claims = require_admin(&headers, &signer, &directory)
            .await
            .map_err(|err| anyhow::anyhow!("expected admin to pass: {err:?}"))?;
        assert_eq!(claims.username, "@mario");
        Ok(())
    }

    #[test]
    fn require_super_admin_is_a_config_comparison() -> Result<()> {
        let signer = signer();
        let headers = headers_with_bearer(&signer.mint(SUPER_ADMIN)?)?;
        assert!(require_super_admin(&headers, &signer, SUPER_ADMIN).is_ok());

        let other = headers_with_bearer(&signer.mint("@mario")?)?;
        assert!(require_super_admin(&other, &signer, SUPER_ADMIN).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn removed_super_admin_keeps_super_but_loses_admin() -> Result<()> {
        // Pins the asymmetry between the two guards: after directory
        // removal the super-admin still passes the config comparison but
        // fails the membership check.
        let signer = signer();
        let directory = directory();
        directory.ensure_default_admin().await?;
        directory.remove(SUPER_ADMIN).await?;

        let headers = headers_with_bearer(&signer.mint(SUPER_ADMIN)?)?;
        assert!(require_super_admin(&headers, &signer, SUPER_ADMIN).is_ok());
        assert!(require_admin(&headers, &signer, &directory).await.is_err());
        Ok(())
    }

    #[test]
    fn missing_bearer_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(verify_bearer(&headers, &signer()).is_err());
    }
}
