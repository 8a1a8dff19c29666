use crate::cli::{
    actions::{server::Args, Action},
    globals::Settings,
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Turn parsed arguments into an executable action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let kv_url = matches
        .get_one::<String>("kv-url")
        .cloned()
        .context("missing required argument: --kv-url")?;

    let kv_token = matches
        .get_one::<String>("kv-token")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --kv-token")?;

    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .cloned()
        .map(SecretString::from)
        .context("missing argument: --jwt-secret")?;

    let token_ttl_minutes = matches
        .get_one::<u64>("token-ttl-minutes")
        .copied()
        .unwrap_or(30);

    let super_admin = matches
        .get_one::<String>("super-admin")
        .cloned()
        .context("missing argument: --super-admin")?;

    let admin_password = matches
        .get_one::<String>("admin-password")
        .cloned()
        .map(SecretString::from)
        .context("missing argument: --admin-password")?;

    let cors_origins =
        Settings::parse_cors_origins(matches.get_one::<String>("cors-origins").map(String::as_str));

    Ok(Action::Server(Args {
        port,
        settings: Settings {
            kv_url,
            kv_token,
            jwt_secret,
            token_ttl_minutes,
            super_admin,
            admin_password,
            cors_origins,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "portineria",
            "--port",
            "9090",
            "--kv-url",
            "https://kv.example.test/",
            "--kv-token",
            "secret-token",
            "--super-admin",
            "@portinaia",
            "--cors-origins",
            "https://a.test,https://b.test",
        ]);

        let Action::Server(args) = handler(&matches).unwrap();
        assert_eq!(args.port, 9090);
        assert_eq!(args.settings.kv_url, "https://kv.example.test/");
        assert_eq!(args.settings.kv_token.expose_secret(), "secret-token");
        assert_eq!(args.settings.jwt_secret.expose_secret(), "dev-secret");
        assert_eq!(args.settings.token_ttl_minutes, 30);
        assert_eq!(args.settings.super_admin, "@portinaia");
        assert_eq!(
            args.settings.cors_origins,
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }
}
