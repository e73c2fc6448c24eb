use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Root of the remote notes collection, e.g. "https://notes.example.com/prod".
    /// Requests go to `{root}/notes` and `{root}/notes/{id}`.
    pub const API_BASE_URL: &str = "NOTES_API_BASE_URL";
}

/// Default values
pub mod defaults {
    pub const API_BASE_URL: &str = "http://127.0.0.1:3000";
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_base_url(env::var(env_vars::API_BASE_URL).ok().as_deref())
    }

    /// Build a config from an optional raw base URL, falling back to the default
    /// when it is missing or not an absolute http(s) URL.
    pub fn from_base_url(raw: Option<&str>) -> Self {
        let api_base_url = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match validate_base_url(raw) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!(
                        "Ignoring {}={:?}: {}; using {}",
                        env_vars::API_BASE_URL,
                        raw,
                        e,
                        defaults::API_BASE_URL
                    );
                    defaults::API_BASE_URL.to_string()
                }
            },
            None => defaults::API_BASE_URL.to_string(),
        };

        Self { api_base_url }
    }
}

fn validate_base_url(raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    Ok(raw.trim_end_matches('/').to_string())
}
