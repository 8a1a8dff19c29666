use crate::{api, api::AppState, cli::globals::Settings, kv::RestKv};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub settings: Settings,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the KV URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // Fail fast on an unparseable store URL instead of at the first command.
    Url::parse(&args.settings.kv_url)?;

    log_startup_args(args.port, &args.settings);

    let kv = Arc::new(RestKv::new(
        &args.settings.kv_url,
        args.settings.kv_token.clone(),
    ));

    let state = AppState::new(args.settings, kv);

    api::new(args.port, state).await
}

fn log_startup_args(port: u16, settings: &Settings) {
    let cors = if settings.cors_origins.is_empty() {
        "unrestricted".to_string()
    } else {
        settings.cors_origins.join(",")
    };
    let entries = [
        ("listen", format!("tcp:{port}")),
        ("kv_url", settings.kv_url.clone()),
        ("kv_token_set", "true".to_string()),
        ("super_admin", settings.super_admin.clone()),
        ("token_ttl_minutes", settings.token_ttl_minutes.to_string()),
        ("cors_origins", cors),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const BANNER: &str = r"
  _____
 |  _  |
 | |_| |  P O R T I N E R I A {VERSION}
 |  ___|
 | |
 |_|";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commit_truncates_long_hashes() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
        assert_eq!(short_commit(" abc "), "abc");
    }

    #[test]
    fn banner_embeds_the_version() {
        assert!(banner().contains(env!("CARGO_PKG_VERSION")));
    }
}
