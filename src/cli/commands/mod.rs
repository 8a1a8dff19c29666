use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("portineria")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORTINERIA_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("kv-url")
                .long("kv-url")
                .help("Base URL of the KV store REST endpoint")
                .env("PORTINERIA_KV_URL")
                .required(true),
        )
        .arg(
            Arg::new("kv-token")
                .long("kv-token")
                .help("Access token for the KV store")
                .env("PORTINERIA_KV_TOKEN")
                .required(true),
        )
        .arg(
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .help("Shared secret used to sign bearer credentials")
                .default_value("dev-secret")
                .env("PORTINERIA_JWT_SECRET"),
        )
        .arg(
            Arg::new("token-ttl-minutes")
                .long("token-ttl-minutes")
                .help("Lifetime of bearers and one-time tokens, in minutes")
                .default_value("30")
                .env("PORTINERIA_TOKEN_TTL_MINUTES")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("super-admin")
                .long("super-admin")
                .help("Username of the single super-admin")
                .default_value("@Lapsus00")
                .env("PORTINERIA_SUPER_ADMIN"),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Static bootstrap password for the super-admin")
                .default_value("history2552@#")
                .env("PORTINERIA_ADMIN_PASSWORD"),
        )
        .arg(
            Arg::new("cors-origins")
                .long("cors-origins")
                .help("Comma-separated allowed CORS origins (default: unrestricted)")
                .env("PORTINERIA_CORS_ORIGINS"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORTINERIA_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "portineria");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_kv() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "portineria",
            "--port",
            "8080",
            "--kv-url",
            "https://kv.example.test",
            "--kv-token",
            "secret-token",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>("kv-url").cloned(),
            Some("https://kv.example.test".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("kv-token").cloned(),
            Some("secret-token".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("super-admin").cloned(),
            Some("@Lapsus00".to_string())
        );
        assert_eq!(
            matches.get_one::<u64>("token-ttl-minutes").copied(),
            Some(30)
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORTINERIA_KV_URL", Some("https://kv.example.test")),
                ("PORTINERIA_KV_TOKEN", Some("secret-token")),
                ("PORTINERIA_PORT", Some("443")),
                ("PORTINERIA_SUPER_ADMIN", Some("@portinaia")),
                ("PORTINERIA_TOKEN_TTL_MINUTES", Some("5")),
                ("PORTINERIA_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["portineria"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("kv-url").cloned(),
                    Some("https://kv.example.test".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("super-admin").cloned(),
                    Some("@portinaia".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>("token-ttl-minutes").copied(),
                    Some(5)
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_missing_kv_arguments_fail() {
        temp_env::with_vars(
            [
                ("PORTINERIA_KV_URL", None::<&str>),
                ("PORTINERIA_KV_TOKEN", None::<&str>),
            ],
            || {
                let result = new().try_get_matches_from(vec!["portineria"]);
                assert_eq!(
                    result.map(|_| ()).map_err(|e| e.kind()),
                    Err(clap::error::ErrorKind::MissingRequiredArgument)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("PORTINERIA_LOG_LEVEL", Some(level)),
                    ("PORTINERIA_KV_URL", Some("https://kv.example.test")),
                    ("PORTINERIA_KV_TOKEN", Some("secret-token")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["portineria"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("PORTINERIA_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "portineria".to_string(),
                    "--kv-url".to_string(),
                    "https://kv.example.test".to_string(),
                    "--kv-token".to_string(),
                    "secret-token".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
