//! HTTP client core: construction, auth and envelope handling.
//!
//! Endpoint wrappers live in sibling modules (`catalog`, `admin`,
//! `events`, `download`) as further `impl MarketplaceApi` blocks.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use sonique_core::envelope::{failure_from_body, Envelope};
use sonique_core::session::BearerToken;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// HTTP client for the marketplace backend.
///
/// Cheap to share behind an `Arc`; the inner [`reqwest::Client`] pools
/// connections.
#[derive(Debug, Clone)]
pub struct MarketplaceApi {
    client: reqwest::Client,
    base_url: String,
}

impl MarketplaceApi {
    /// Create a client from validated settings.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- request construction ----

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str, token: Option<&BearerToken>) -> RequestBuilder {
        with_auth(self.client.get(self.url(path)), token)
    }

    pub(crate) fn post(&self, path: &str, token: Option<&BearerToken>) -> RequestBuilder {
        with_auth(self.client.post(self.url(path)), token)
    }

    pub(crate) fn put(&self, path: &str, token: Option<&BearerToken>) -> RequestBuilder {
        with_auth(self.client.put(self.url(path)), token)
    }

    pub(crate) fn delete(&self, path: &str, token: Option<&BearerToken>) -> RequestBuilder {
        with_auth(self.client.delete(self.url(path)), token)
    }

    // ---- response handling ----

    /// Send a request and return its successful envelope.
    ///
    /// Non-2xx statuses become [`ApiError::Http`] (with any JSON error body
    /// decoded), `success: false` bodies become [`ApiError::Application`].
    pub(crate) async fn send_envelope(builder: RequestBuilder) -> Result<Envelope, ApiError> {
        let response = Self::ensure_success(builder.send().await?).await?;
        let body: Value = response.json().await?;
        let envelope = Envelope::new(body);

        if let Some(failure) = envelope.failure() {
            tracing::warn!(message = %failure.message, "Backend reported failure");
            return Err(ApiError::Application {
                message: failure.message,
                errors: failure.errors,
            });
        }
        Ok(envelope)
    }

    /// Send and decode the whole body into `T`.
    pub(crate) async fn send_payload<T: DeserializeOwned>(
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        Ok(Self::send_envelope(builder).await?.payload()?)
    }

    /// Send and decode the value under `key` (or `data`) into `T`.
    pub(crate) async fn send_field<T: DeserializeOwned>(
        builder: RequestBuilder,
        key: &str,
    ) -> Result<T, ApiError> {
        Ok(Self::send_envelope(builder).await?.field(key)?)
    }

    /// Send an action request, discarding the payload.
    pub(crate) async fn send_action(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::send_envelope(builder).await?;
        Ok(())
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Http`] carrying the
    /// decoded failure message and field errors.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let failure = serde_json::from_str::<Value>(&text)
            .ok()
            .map(|body| failure_from_body(&body));

        let (message, errors) = match failure {
            Some(f) => (f.message, f.errors),
            None => (
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
                Default::default(),
            ),
        };

        tracing::warn!(status = status.as_u16(), %message, "Backend returned error status");
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
            errors,
        })
    }
}

fn with_auth(builder: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token.as_str()),
        None => builder,
    }
}
