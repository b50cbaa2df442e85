//! Public catalog endpoints: sounds, categories and likes.

use reqwest::RequestBuilder;

use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::forms::SoundForm;
use sonique_core::likes::LikeToggle;
use sonique_core::models::{Category, Sound};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    /// List sounds matching `filter`.
    ///
    /// Sends `GET /api/sounds` with only the non-default filter values.
    /// The token is optional; when present the backend fills `is_liked`.
    pub async fn list_sounds(
        &self,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> Result<Page<Sound>, ApiError> {
        let envelope = Self::send_envelope(self.list_sounds_request(filter, token)).await?;
        let page: Page<Sound> = envelope.page("sounds")?;
        tracing::debug!(
            count = page.items.len(),
            page = page.pagination.current_page,
            "Listed sounds"
        );
        Ok(page)
    }

    fn list_sounds_request(&self, filter: &FilterState, token: Option<&BearerToken>) -> RequestBuilder {
        self.get("/api/sounds", token).query(&filter.query_pairs())
    }

    /// Fetch a single sound.
    pub async fn get_sound(
        &self,
        id: DbId,
        token: Option<&BearerToken>,
    ) -> Result<Sound, ApiError> {
        Self::send_field(self.get(&format!("/api/sounds/{id}"), token), "sound").await
    }

    /// Save the edit-sound form with `PUT /api/sounds/{id}`.
    ///
    /// Callers are expected to have run [`SoundForm::check`] first.
    pub async fn update_sound(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &SoundForm,
    ) -> Result<Sound, ApiError> {
        let builder = self
            .put(&format!("/api/sounds/{id}"), Some(token))
            .json(&form.to_payload());
        let sound: Sound = Self::send_field(builder, "sound").await?;
        tracing::info!(sound_id = id, "Sound updated");
        Ok(sound)
    }

    /// Toggle the current user's like on a sound.
    pub async fn toggle_sound_like(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<LikeToggle, ApiError> {
        Self::send_payload(self.post(&format!("/api/sounds/{id}/like"), Some(token))).await
    }

    /// Toggle the current user's like on a clip.
    pub async fn toggle_clip_like(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<LikeToggle, ApiError> {
        Self::send_payload(self.post(&format!("/api/clips/{id}/like"), Some(token))).await
    }

    /// Sounds of one category, paginated like [`Self::list_sounds`].
    pub async fn category_sounds(
        &self,
        category_id: DbId,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> Result<Page<Sound>, ApiError> {
        let builder = self
            .get(&format!("/api/categories/{category_id}/sounds"), token)
            .query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("sounds")?)
    }

    /// Active categories, as shown in catalog filters.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        Self::send_field(self.get("/api/categories", None), "categories").await
    }
}
