//! HTTP surface: router construction and the server loop.

pub mod error;
pub mod handlers;
pub mod openapi;

use crate::auth::{AdminDirectory, BearerSigner, MagicTokens};
use crate::cli::globals::Settings;
use crate::kv::KvStore;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

/// Per-request context shared by all handlers. Cheap to clone: everything
/// state-like lives behind the KV store.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub signer: BearerSigner,
    pub directory: AdminDirectory,
    pub magic: MagicTokens,
}

impl AppState {
    #[must_use]
    pub fn new(settings: Settings, kv: Arc<dyn KvStore>) -> Self {
        let signer = BearerSigner::new(settings.jwt_secret.clone(), settings.token_ttl_minutes);
        let directory = AdminDirectory::new(kv.clone(), &settings.super_admin);
        let magic = MagicTokens::new(kv);

        Self {
            settings: Arc::new(settings),
            signer,
            directory,
            magic,
        }
    }
}

/// Build the application router with all middleware layers applied.
#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);

    Router::new()
        .route(
            "/auth",
            get(handlers::auth::whoami).post(handlers::auth::authenticate),
        )
        .route(
            "/admins",
            get(handlers::admins::list).post(handlers::admins::create),
        )
        .route("/admins/:username", delete(handlers::admins::remove))
        .route("/healthz", get(handlers::health::healthz))
        .route("/openapi.json", get(openapi::serve))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state)),
        )
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Start the server.
///
/// Seeds the default admin before accepting requests, so authorization
/// checks for the super-admin always succeed on a fresh store.
///
/// # Errors
/// Returns an error if the default admin cannot be seeded or the server
/// fails to start.
pub async fn new(port: u16, state: AppState) -> Result<()> {
    state
        .directory
        .ensure_default_admin()
        .await
        .context("Failed to seed the default admin")?;

    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
