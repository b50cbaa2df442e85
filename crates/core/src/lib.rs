//! Sonique core domain.
//!
//! Pure types and helpers shared by the REST client and the view layer:
//! entity models, status unions, the response envelope, list filters,
//! form validation, download helpers and like reconciliation. No I/O.

pub mod download;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod forms;
pub mod likes;
pub mod models;
pub mod moderation;
pub mod session;
pub mod status;
pub mod types;
