//! Response envelope, pagination and field-error types.
//!
//! Every backend JSON response is wrapped as `{ "success": bool, ... }`.
//! Failures carry `message` or `error` plus an optional `errors` map keyed
//! by form field. List responses carry their rows under a resource key
//! (`sounds`, `clips`, ...) or under `data`, next to a `pagination` block.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback message when a failure envelope carries neither `message` nor `error`.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Validation messages keyed by form field name.
///
/// Ordered so that rendering and test assertions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// All messages recorded for `field` (empty when the field is valid).
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for `field`, the one a form shows inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the fields carrying errors.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge another set of errors into this one, keeping existing messages.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Pagination block returned next to list payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    /// Explicit continuation flag. Some endpoints omit it and only send
    /// `last_page`.
    #[serde(default)]
    pub has_more: Option<bool>,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// Pagination describing a single, complete page of `len` items.
    pub fn single_page(len: usize) -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: len as u32,
            total: len as u64,
            has_more: Some(false),
        }
    }

    /// Whether a further page can be requested.
    pub fn has_more(&self) -> bool {
        self.has_more
            .unwrap_or(self.current_page < self.last_page)
    }

    /// Page number a "load more" request should ask for.
    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then(|| self.current_page + 1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::single_page(0)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Application-level failure carried by a `success: false` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFailure {
    pub message: String,
    pub errors: FieldErrors,
}

/// A decoded response body, not yet split into payload or failure.
#[derive(Debug, Clone)]
pub struct Envelope {
    body: Value,
}

impl Envelope {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// A body without a `success` key counts as successful; several
    /// action endpoints (e.g. like toggles) reply with the bare payload.
    pub fn is_success(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Failure details, or `None` for a successful body.
    pub fn failure(&self) -> Option<EnvelopeFailure> {
        if self.is_success() {
            return None;
        }
        Some(failure_from_body(&self.body))
    }

    /// Deserialize the whole body into `T`; `T` picks the fields it needs.
    pub fn payload<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body)
    }

    /// Deserialize the value under `key` (falling back to `data`) into `T`.
    pub fn field<T: DeserializeOwned>(mut self, key: &str) -> Result<T, serde_json::Error> {
        let value = take_key(&mut self.body, key).unwrap_or(Value::Null);
        serde_json::from_value(value)
    }

    /// Extract a list page stored under `key` (or `data`) plus `pagination`.
    ///
    /// A missing `pagination` block is read as a single complete page.
    pub fn page<T: DeserializeOwned>(mut self, key: &str) -> Result<Page<T>, serde_json::Error> {
        let rows = take_key(&mut self.body, key).unwrap_or(Value::Array(Vec::new()));
        let items: Vec<T> = serde_json::from_value(rows)?;
        let pagination = match self.body.get_mut("pagination").map(Value::take) {
            Some(Value::Null) | None => Pagination::single_page(items.len()),
            Some(value) => serde_json::from_value(value)?,
        };
        Ok(Page::new(items, pagination))
    }
}

/// Build an [`EnvelopeFailure`] from any JSON error body, including bodies
/// attached to non-2xx responses.
pub fn failure_from_body(body: &Value) -> EnvelopeFailure {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or(DEFAULT_FAILURE_MESSAGE)
        .to_string();

    let errors = body
        .get("errors")
        .cloned()
        .and_then(|v| serde_json::from_value::<FieldErrors>(v).ok())
        .unwrap_or_default();

    EnvelopeFailure { message, errors }
}

fn take_key(body: &mut Value, key: &str) -> Option<Value> {
    let obj = body.as_object_mut()?;
    obj.remove(key)
        .filter(|v| !v.is_null())
        .or_else(|| obj.remove("data").filter(|v| !v.is_null()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
