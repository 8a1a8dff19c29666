use super::handlers::{admins, auth, health};
use crate::auth::Claims;
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        auth::whoami,
        auth::authenticate,
        admins::list,
        admins::create,
        admins::remove,
    ),
    components(schemas(
        Claims,
        auth::AuthRequest,
        auth::AuthResponse,
        auth::TokenResponse,
        auth::UserResponse,
        admins::AdminRequest,
        admins::AdminsResponse,
    )),
    tags(
        (name = "auth", description = "Bearer issuance and the four-intent exchange protocol"),
        (name = "admins", description = "Admin directory management"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Serve the generated `OpenAPI` document.
pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn document_covers_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in ["/auth", "/admins", "/admins/{username}", "/healthz"] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
