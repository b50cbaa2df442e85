//! Admin endpoints. Every call here is role-gated and takes a token.

pub mod analytics;
pub mod categories;
pub mod certifications;
pub mod clips;
pub mod payments;
pub mod sounds;

use serde::Deserialize;

/// Body of a `batch-action` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BatchOutcome {
    /// Number of rows the backend changed.
    #[serde(default)]
    pub affected: u64,
}
