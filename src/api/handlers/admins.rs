//! Admin directory management endpoints.
//!
//! Listing is open to any admin; mutation is reserved to the super-admin.

use crate::api::{error::ApiError, AppState};
use crate::auth::guards::{require_admin, require_super_admin};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminsResponse {
    pub admins: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/admins",
    responses(
        (status = 200, description = "Current admin usernames", body = AdminsResponse),
        (status = 401, description = "Caller is not an admin")
    ),
    tag = "admins",
)]
/// List current admin usernames.
pub async fn list(
    state: Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminsResponse>, ApiError> {
    require_admin(&headers, &state.signer, &state.directory).await?;
    let admins = state.directory.list().await?;
    Ok(Json(AdminsResponse { admins }))
}

#[utoipa::path(
    post,
    path = "/admins",
    request_body = AdminRequest,
    responses(
        (status = 201, description = "Updated admin usernames", body = AdminsResponse),
        (status = 400, description = "Missing username"),
        (status = 401, description = "Caller is not the super-admin")
    ),
    tag = "admins",
)]
/// Add an admin username; idempotent.
pub async fn create(
    state: Extension<AppState>,
    headers: HeaderMap,
    payload: Option<Json<AdminRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = require_super_admin(&headers, &state.signer, &state.settings.super_admin)?;

    let username = payload
        .as_ref()
        .and_then(|Json(request)| request.username.as_deref())
        .filter(|username| !username.is_empty())
        .ok_or_else(|| ApiError::bad_request("username is required"))?
        .to_string();

    let admins = state.directory.add(&username).await?;
    info!("{} added admin {username}", caller.username);
    Ok((StatusCode::CREATED, Json(AdminsResponse { admins })))
}

#[utoipa::path(
    delete,
    path = "/admins/{username}",
    params(
        ("username" = String, Path, description = "Admin username to remove")
    ),
    responses(
        (status = 204, description = "Removed (or was never a member)"),
        (status = 401, description = "Caller is not the super-admin")
    ),
    tag = "admins",
)]
/// Remove an admin username; idempotent, even for the super-admin itself.
pub async fn remove(
    state: Extension<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = require_super_admin(&headers, &state.signer, &state.settings.super_admin)?;
    state.directory.remove(&username).await?;
    info!("{} removed admin {username}", caller.username);
    Ok(StatusCode::NO_CONTENT)
}
