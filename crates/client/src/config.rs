//! Client connection settings.

use crate::error::ApiError;

/// Default backend location for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Settings for a [`MarketplaceApi`](crate::MarketplaceApi).
///
/// No request timeout is configured; transport defaults apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base HTTP URL without trailing slash, e.g. `https://api.example.com`.
    pub base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Build a config, validating and normalizing `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            user_agent: default_user_agent(),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("sonique-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("base URL must not be empty".to_string()));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ApiError::InvalidUrl(format!(
            "base URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_removed() {
        assert_eq!(
            normalize_base_url(" https://api.example.com// ").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn scheme_required() {
        assert!(normalize_base_url("api.example.com").is_err());
        assert!(normalize_base_url("").is_err());
    }

    #[test]
    fn default_points_at_localhost() {
        assert_eq!(ClientConfig::default().base_url, DEFAULT_BASE_URL);
        assert!(ClientConfig::default().user_agent.starts_with("sonique-client/"));
    }
}
