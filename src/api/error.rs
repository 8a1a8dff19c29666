//! HTTP error taxonomy.
//!
//! Every failure maps directly to a status and a human-readable reason;
//! there is no local recovery and no retry. Backend failures are surfaced
//! as a server error, never masked as `Unauthorized`, since they indicate
//! infrastructure failure rather than a credential problem.

use crate::kv::KvError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed required fields, unsupported intent.
    BadRequest(String),
    /// Bad password, invalid bearer, insufficient privilege, dead token.
    Unauthorized(String),
    /// KV transport or protocol failure.
    Backend(KvError),
    /// Unexpected internal failure (e.g. credential encoding).
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<KvError> for ApiError {
    fn from(err: KvError) -> Self {
        Self::Backend(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Backend(err) => {
                error!("kv backend failure: {err}");
                (StatusCode::BAD_GATEWAY, "backend unavailable".to_string())
            }
            Self::Internal(message) => {
                error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
