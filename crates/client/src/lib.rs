//! REST client for the Sonique marketplace backend.
//!
//! [`MarketplaceApi`] wraps every endpoint the client consumes: catalog,
//! likes, downloads, admin moderation (sounds, clips, categories),
//! payments, certifications, analytics, events and competitions. Every
//! response goes through the `{success, ...}` envelope check so callers
//! get a single [`ApiError`] taxonomy.

pub mod admin;
pub mod api;
pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod events;

pub use api::MarketplaceApi;
pub use config::ClientConfig;
pub use download::ByteStream;
pub use error::ApiError;
