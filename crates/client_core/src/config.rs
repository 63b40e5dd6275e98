use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const SERVER_URL_ENV: &str = "PETMAP_SERVER_URL";

/// Where the backend lives. Resolution order: CLI flag, then the
/// `PETMAP_SERVER_URL` environment variable, then the local default.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn resolve(cli_override: Option<String>) -> Self {
        Self::resolve_from(cli_override, std::env::var(SERVER_URL_ENV).ok())
    }

    fn resolve_from(cli_override: Option<String>, env_value: Option<String>) -> Self {
        let server_url = cli_override
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self { server_url }
    }

    pub fn parsed_url(&self) -> Result<Url> {
        Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server URL: {}", self.server_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_override_wins_over_environment() {
        let config = ClientConfig::resolve_from(
            Some("http://cli:3000".to_string()),
            Some("http://env:3000".to_string()),
        );
        assert_eq!(config.server_url, "http://cli:3000");
    }

    #[test]
    fn environment_wins_over_default() {
        let config = ClientConfig::resolve_from(None, Some("http://env:3000".to_string()));
        assert_eq!(config.server_url, "http://env:3000");
    }

    #[test]
    fn blank_values_fall_through_to_default() {
        let config = ClientConfig::resolve_from(Some("  ".to_string()), None);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn rejects_unparseable_urls() {
        let config = ClientConfig {
            server_url: "not a url".to_string(),
        };
        assert!(config.parsed_url().is_err());
    }
}
