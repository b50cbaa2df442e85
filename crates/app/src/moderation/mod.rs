//! Admin moderation pages for sounds and clips.

pub mod clips;
pub mod sounds;

pub use clips::{ClipModeration, ClipModerationSource};
pub use sounds::{SoundModeration, SoundModerationSource};

use sonique_client::ApiError;

/// Error returned by gated list adapters called without a token. The
/// loader checks the session first, so this only surfaces on misuse.
pub(crate) fn missing_token() -> ApiError {
    ApiError::Http {
        status: 401,
        message: "Unauthenticated.".to_string(),
        errors: Default::default(),
    }
}
