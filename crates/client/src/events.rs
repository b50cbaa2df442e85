//! Event and competition endpoints.

use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::models::{Competition, Event};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    pub async fn list_events(&self, filter: &FilterState) -> Result<Page<Event>, ApiError> {
        let builder = self.get("/api/events", None).query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("events")?)
    }

    pub async fn get_event(&self, id: DbId) -> Result<Event, ApiError> {
        Self::send_field(self.get(&format!("/api/events/{id}"), None), "event").await
    }

    /// Register the current user. Returns the refreshed event when the
    /// backend includes it.
    pub async fn register_for_event(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Event>, ApiError> {
        let event = Self::send_field(
            self.post(&format!("/api/events/{id}/register"), Some(token)),
            "event",
        )
        .await?;
        tracing::info!(event_id = id, "Registered for event");
        Ok(event)
    }

    pub async fn list_competitions(&self, filter: &FilterState) -> Result<Page<Competition>, ApiError> {
        let builder = self
            .get("/api/competitions", None)
            .query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("competitions")?)
    }

    pub async fn get_competition(&self, id: DbId) -> Result<Competition, ApiError> {
        Self::send_field(self.get(&format!("/api/competitions/{id}"), None), "competition").await
    }
}
