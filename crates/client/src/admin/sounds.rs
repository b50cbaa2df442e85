//! Sound moderation endpoints.

use reqwest::RequestBuilder;

use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::forms::RejectionForm;
use sonique_core::models::Sound;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    /// List sounds for moderation (all statuses unless filtered).
    pub async fn admin_list_sounds(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> Result<Page<Sound>, ApiError> {
        let builder = self.get("/api/admin/sounds", Some(token)).query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("sounds")?)
    }

    /// Approve a pending sound. Returns the updated row when the backend
    /// includes it.
    pub async fn approve_sound(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Sound>, ApiError> {
        let sound = Self::send_field(self.post(&format!("/api/admin/sounds/{id}/approve"), Some(token)), "sound").await?;
        tracing::info!(sound_id = id, "Sound approved");
        Ok(sound)
    }

    /// Reject a pending sound with a moderator reason.
    pub async fn reject_sound(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Sound>, ApiError> {
        let sound = Self::send_field(self.reject_sound_request(token, id, form), "sound").await?;
        tracing::info!(sound_id = id, "Sound rejected");
        Ok(sound)
    }

    fn reject_sound_request(&self, token: &BearerToken, id: DbId, form: &RejectionForm) -> RequestBuilder {
        self.post(&format!("/api/admin/sounds/{id}/reject"), Some(token))
            .json(&form.to_payload())
    }

    /// Permanently delete a sound.
    pub async fn delete_sound(&self, token: &BearerToken, id: DbId) -> Result<(), ApiError> {
        Self::send_action(self.delete(&format!("/api/admin/sounds/{id}"), Some(token))).await?;
        tracing::info!(sound_id = id, "Sound deleted");
        Ok(())
    }
}
