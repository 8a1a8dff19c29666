//! The authentication protocol: `GET /auth` (whoami) and the four-intent
//! `POST /auth` state machine.
//!
//! Each intent is processed independently and statelessly except for its
//! reads and writes against the admin set and the magic token bindings:
//!
//! - `password`: bootstrap path; the static password yields a super-admin
//!   bearer when no bearer exists yet.
//! - `create`: super-admin mints a one-time token for a username, to be
//!   handed over out of band.
//! - `exchange`: the token is consumed (exactly once) for a bearer, but
//!   only while its owner is still in the directory.
//! - `impersonate`: super-admin shortcut that skips the token hop under
//!   the same privilege constraints.

use crate::api::{error::ApiError, AppState};
use crate::auth::guards::{require_super_admin, verify_bearer};
use crate::auth::Claims;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthRequest {
    #[serde(default = "default_intent")]
    pub intent: String,
    pub username: Option<String>,
    pub token: Option<String>,
    pub password: Option<String>,
}

// The original public API treated a missing intent as an exchange.
fn default_intent() -> String {
    "exchange".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub bearer: String,
    #[serde(rename = "expiresInMinutes")]
    pub expires_in_minutes: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "expiresInMinutes")]
    pub expires_in_minutes: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: Claims,
}

/// One variant per supported intent so the dispatch below is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Password,
    Create,
    Exchange,
    Impersonate,
}

impl Intent {
    fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "password" => Ok(Self::Password),
            "create" => Ok(Self::Create),
            "exchange" => Ok(Self::Exchange),
            "impersonate" => Ok(Self::Impersonate),
            other => Err(ApiError::bad_request(format!(
                "unsupported intent: {other}"
            ))),
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth",
    responses(
        (status = 200, description = "Claims of the presented bearer", body = UserResponse),
        (status = 401, description = "Bearer missing, invalid, or expired")
    ),
    tag = "auth",
)]
/// Return the claims of the presented bearer.
pub async fn whoami(
    state: Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let user = verify_bearer(&headers, &state.signer)?;
    Ok(Json(UserResponse { user }))
}

#[utoipa::path(
    post,
    path = "/auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Bearer issued", body = AuthResponse),
        (status = 201, description = "One-time token issued", body = TokenResponse),
        (status = 400, description = "Missing field or unsupported intent"),
        (status = 401, description = "Authentication failed")
    ),
    tag = "auth",
)]
/// Process one authentication intent.
#[instrument(skip_all)]
pub async fn authenticate(
    state: Extension<AppState>,
    headers: HeaderMap,
    payload: Option<Json<AuthRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::bad_request("missing payload"));
    };

    debug!("auth intent: {}", request.intent);

    match Intent::parse(&request.intent)? {
        Intent::Password => password_intent(&state, &request),
        Intent::Create => create_intent(&state, &headers, &request).await,
        Intent::Exchange => exchange_intent(&state, &request).await,
        Intent::Impersonate => impersonate_intent(&state, &headers, &request).await,
    }
}

fn bearer_response(state: &AppState, username: &str) -> Result<Response, ApiError> {
    let bearer = state
        .signer
        .mint(username)
        .map_err(|err| ApiError::internal(format!("failed to mint bearer: {err}")))?;

    Ok(Json(AuthResponse {
        bearer,
        expires_in_minutes: state.signer.ttl_minutes(),
    })
    .into_response())
}

fn required_field<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(format!("{name} is required"))),
    }
}

fn password_intent(state: &AppState, request: &AuthRequest) -> Result<Response, ApiError> {
    use secrecy::ExposeSecret;

    let supplied = request.password.as_deref().unwrap_or_default();
    if supplied.is_empty() || supplied != state.settings.admin_password.expose_secret() {
        return Err(ApiError::unauthorized("wrong password"));
    }

    bearer_response(state, &state.settings.super_admin)
}

async fn create_intent(
    state: &AppState,
    headers: &HeaderMap,
    request: &AuthRequest,
) -> Result<Response, ApiError> {
    require_super_admin(headers, &state.signer, &state.settings.super_admin)?;
    let username = required_field(&request.username, "username")?;

    let ttl_minutes = state.settings.token_ttl_minutes;
    let token = state.magic.issue(username, ttl_minutes).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            expires_in_minutes: ttl_minutes,
        }),
    )
        .into_response())
}

async fn exchange_intent(state: &AppState, request: &AuthRequest) -> Result<Response, ApiError> {
    let token = required_field(&request.token, "token")?;

    let owner = state
        .magic
        .consume(token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;

    // The owner must still be a directory member at exchange time.
    if !state.directory.is_admin(&owner).await? {
        return Err(ApiError::unauthorized("invalid or expired token"));
    }

    bearer_response(state, &owner)
}

async fn impersonate_intent(
    state: &AppState,
    headers: &HeaderMap,
    request: &AuthRequest,
) -> Result<Response, ApiError> {
    require_super_admin(headers, &state.signer, &state.settings.super_admin)?;
    let username = required_field(&request.username, "username")?;

    if !state.directory.is_admin(username).await? {
        return Err(ApiError::unauthorized("target is not an admin"));
    }

    bearer_response(state, username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_parsing_is_exhaustive_over_the_protocol() {
        assert_eq!(Intent::parse("password").ok(), Some(Intent::Password));
        assert_eq!(Intent::parse("create").ok(), Some(Intent::Create));
        assert_eq!(Intent::parse("exchange").ok(), Some(Intent::Exchange));
        assert_eq!(Intent::parse("impersonate").ok(), Some(Intent::Impersonate));
        assert!(Intent::parse("refresh").is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn missing_intent_defaults_to_exchange() {
        let request: AuthRequest = serde_json::from_str(r#"{"token":"ABC"}"#).unwrap();
        assert_eq!(request.intent, "exchange");
    }

    #[test]
    fn required_field_rejects_missing_and_empty() {
        assert!(required_field(&None, "username").is_err());
        assert!(required_field(&Some(String::new()), "username").is_err());
        assert_eq!(
            required_field(&Some("@mario".to_string()), "username").ok(),
            Some("@mario")
        );
    }
}
