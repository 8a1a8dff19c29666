//! Credential issuer: signed, self-contained bearer credentials.
//!
//! Bearers are HS256 JWTs carrying `{username, exp}` signed with a shared
//! secret configured at startup. They are stateless: validity is entirely
//! determined by signature and expiry at verification time, so a bearer
//! cannot be revoked before it expires. An expired bearer has no recovery
//! path except reauthentication.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use utoipa::ToSchema;

type HmacSha256 = Hmac<Sha256>;

const SECONDS_PER_MINUTE: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Claims {
    pub username: String,
    /// Absolute expiry, unix seconds UTC.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum BearerError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    Key,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, BearerError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, BearerError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| BearerError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Clone)]
pub struct BearerSigner {
    secret: SecretString,
    ttl_minutes: u64,
}

impl BearerSigner {
    #[must_use]
    pub fn new(secret: SecretString, ttl_minutes: u64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    #[must_use]
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_minutes
    }

    fn mac(&self) -> Result<HmacSha256, BearerError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| BearerError::Key)
    }

    /// Mint a bearer for `username` expiring `ttl_minutes` from now.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be encoded or the key is invalid.
    pub fn mint(&self, username: &str) -> Result<String, BearerError> {
        self.mint_at(username, Utc::now().timestamp())
    }

    fn mint_at(&self, username: &str, now: i64) -> Result<String, BearerError> {
        let ttl_minutes = i64::try_from(self.ttl_minutes).unwrap_or(i64::MAX);
        let claims = Claims {
            username: username.to_string(),
            exp: now.saturating_add(ttl_minutes.saturating_mul(SECONDS_PER_MINUTE)),
        };

        let header_b64 = b64e_json(&Header::hs256())?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a bearer: signature, payload shape, and expiry.
    ///
    /// # Errors
    /// Returns an error on bad signature, malformed payload, or expiry in
    /// the past.
    pub fn verify(&self, token: &str) -> Result<Claims, BearerError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, BearerError> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(BearerError::TokenFormat),
            };

        let header: Header = b64d_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(BearerError::UnsupportedAlg(header.alg));
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| BearerError::Base64)?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| BearerError::InvalidSignature)?;

        let claims: Claims = b64d_json(claims_b64)?;
        if claims.exp <= now {
            return Err(BearerError::Expired);
        }

        Ok(claims)
    }
}
