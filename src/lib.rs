//! # Portineria
//!
//! `portineria` is the administrative access-control service for the catalog.
//! It issues, exchanges, and validates short-lived bearer credentials for a
//! two-tier admin hierarchy: one **super-admin** fixed by configuration and
//! any number of ordinary admins kept in a remote key-value store.
//!
//! ## Token lifecycle
//!
//! The super-admin bootstraps with a static password and receives a signed
//! bearer. From there it can mint one-time **magic tokens** bound to a
//! username and hand them out of band (e.g. over a messaging app); the
//! recipient exchanges the token exactly once for their own bearer. Bearers
//! are stateless HS256 credentials, never persisted and never revocable
//! before expiry.
//!
//! ## State
//!
//! All durable state (the admin set and pending magic tokens) lives in the
//! remote KV store, reached over its REST command protocol. The service
//! keeps no caches: every authorization decision re-reads the store, so
//! directory changes take effect on the next request.

pub mod api;
pub mod auth;
pub mod cli;
pub mod kv;

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Commit hash embedded at build time, `unknown` outside a git checkout.
pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
