//! View-state layer of the Sonique client.
//!
//! Each page of the marketplace is modelled as a headless view object
//! holding its local state (lists, filters, loading flags, form errors)
//! and talking to the backend through a small source trait. Shared
//! providers (session, cart, toasts, confirmation) are built once in an
//! [`AppContext`] and handed to every view.
//!
//! Production views use [`MarketplaceApi`](sonique_client::MarketplaceApi)
//! as their source (see [`sources`]); tests substitute in-memory fakes.

pub mod admin;
pub mod carousel;
pub mod cart;
pub mod config;
pub mod confirm;
pub mod context;
pub mod debounce;
pub mod download;
pub mod edit_sound;
pub mod error;
pub mod events;
pub mod likes;
pub mod loader;
pub mod moderation;
pub mod session;
pub mod sources;
pub mod toast;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::AppError;
