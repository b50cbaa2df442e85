use std::path::PathBuf;
use std::time::Duration;

use sonique_client::config::DEFAULT_BASE_URL;

/// Default quiet period before a search keystroke triggers a fetch.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;

/// Default time a completed download stays visible before being cleared.
pub const DEFAULT_DOWNLOAD_RESET_SECS: u64 = 3;

/// Default number of toasts kept for inspection.
pub const DEFAULT_TOAST_HISTORY: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
///
/// Every field has a default suitable for a local backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL (default: `http://localhost:8000`).
    pub api_url: String,
    /// Pre-issued bearer token; `None` starts an anonymous session.
    pub api_token: Option<String>,
    pub search_debounce: Duration,
    pub download_reset: Duration,
    /// Directory completed downloads are written to (default: `.`).
    pub download_dir: PathBuf,
    pub toast_history: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            download_reset: Duration::from_secs(DEFAULT_DOWNLOAD_RESET_SECS),
            download_dir: PathBuf::from("."),
            toast_history: DEFAULT_TOAST_HISTORY,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `SONIQUE_API_URL`             | `http://localhost:8000` |
    /// | `SONIQUE_API_TOKEN`           | none                    |
    /// | `SONIQUE_SEARCH_DEBOUNCE_MS`  | `400`                   |
    /// | `SONIQUE_DOWNLOAD_RESET_SECS` | `3`                     |
    /// | `SONIQUE_DOWNLOAD_DIR`        | `.`                     |
    /// | `SONIQUE_TOAST_HISTORY`       | `50`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("SONIQUE_API_URL").unwrap_or(defaults.api_url);
        let api_token = non_empty("SONIQUE_API_TOKEN");

        let search_debounce = match non_empty("SONIQUE_SEARCH_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(parse_number("SONIQUE_SEARCH_DEBOUNCE_MS", &raw)?),
            None => defaults.search_debounce,
        };
        let download_reset = match non_empty("SONIQUE_DOWNLOAD_RESET_SECS") {
            Some(raw) => Duration::from_secs(parse_number("SONIQUE_DOWNLOAD_RESET_SECS", &raw)?),
            None => defaults.download_reset,
        };
        let download_dir = non_empty("SONIQUE_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir);
        let toast_history = match non_empty("SONIQUE_TOAST_HISTORY") {
            Some(raw) => parse_number("SONIQUE_TOAST_HISTORY", &raw)? as usize,
            None => defaults.toast_history,
        };

        Ok(Self {
            api_url,
            api_token,
            search_debounce,
            download_reset,
            download_dir,
            toast_history,
        })
    }
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected: "a non-negative integer",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.api_token.is_none());
        assert_eq!(config.search_debounce, Duration::from_millis(400));
        assert_eq!(config.download_reset, Duration::from_secs(3));
        assert_eq!(config.toast_history, 50);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("SONIQUE_API_URL", "https://api.example.org"),
            ("SONIQUE_API_TOKEN", "tok"),
            ("SONIQUE_SEARCH_DEBOUNCE_MS", "250"),
            ("SONIQUE_DOWNLOAD_DIR", "/tmp/dl"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.download_dir, PathBuf::from("/tmp/dl"));
    }

    #[test]
    fn blank_token_means_anonymous() {
        let config = load(&[("SONIQUE_API_TOKEN", "  ")]).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = load(&[("SONIQUE_DOWNLOAD_RESET_SECS", "soon")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "SONIQUE_DOWNLOAD_RESET_SECS", .. });
        assert!(err.to_string().contains("\"soon\""));
    }
}
