use secrecy::SecretString;

/// Runtime configuration, constructed once at startup and injected into
/// each component; never read from ambient global state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kv_url: String,
    pub kv_token: SecretString,
    pub jwt_secret: SecretString,
    pub token_ttl_minutes: u64,
    pub super_admin: String,
    pub admin_password: SecretString,
    /// Empty means unrestricted.
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Split a comma-separated origin list, dropping empty entries.
    #[must_use]
    pub fn parse_cors_origins(raw: Option<&str>) -> Vec<String> {
        raw.map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }
}
