//! Clip moderation endpoints.

use reqwest::RequestBuilder;
use serde_json::json;

use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::forms::RejectionForm;
use sonique_core::models::Clip;
use sonique_core::moderation::BatchAction;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use super::BatchOutcome;
use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    pub async fn admin_list_clips(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> Result<Page<Clip>, ApiError> {
        let builder = self.get("/api/admin/clips", Some(token)).query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("clips")?)
    }

    pub async fn approve_clip(&self, token: &BearerToken, id: DbId) -> Result<Option<Clip>, ApiError> {
        let clip = Self::send_field(self.post(&format!("/api/admin/clips/{id}/approve"), Some(token)), "clip").await?;
        tracing::info!(clip_id = id, "Clip approved");
        Ok(clip)
    }

    pub async fn reject_clip(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Clip>, ApiError> {
        let builder = self
            .post(&format!("/api/admin/clips/{id}/reject"), Some(token))
            .json(&form.to_payload());
        let clip = Self::send_field(builder, "clip").await?;
        tracing::info!(clip_id = id, "Clip rejected");
        Ok(clip)
    }

    /// Flip the featured flag. Returns the updated clip when provided.
    pub async fn toggle_clip_featured(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Clip>, ApiError> {
        Self::send_field(
            self.post(&format!("/api/admin/clips/{id}/toggle-featured"), Some(token)),
            "clip",
        )
        .await
    }

    /// Apply one action to many clips at once.
    pub async fn clips_batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, ApiError> {
        let outcome: BatchOutcome =
            Self::send_payload(self.clips_batch_request(token, ids, action, reason)).await?;
        tracing::info!(action = action.as_str(), count = ids.len(), affected = outcome.affected, "Clip batch action applied");
        Ok(outcome)
    }

    fn clips_batch_request(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> RequestBuilder {
        let body = json!({
            "ids": ids,
            "action": action.as_str(),
            "reason": reason.map(|r| r.reason.trim()),
        });
        self.post("/api/admin/clips/batch-action", Some(token)).json(&body)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::tests::api;

    use super::*;

    #[test]
    fn batch_body_lists_ids_and_action() {
        let token = BearerToken::new("t");
        let req = api()
            .clips_batch_request(&token, &[1, 2, 3], BatchAction::Delete, None)
            .build()
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(req.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(json["ids"], json!([1, 2, 3]));
        assert_eq!(json["action"], "delete");
        assert!(json["reason"].is_null());
    }
}
