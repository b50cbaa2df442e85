//! Production sources: every view trait implemented on
//! [`MarketplaceApi`], plus list adapters for the public catalog.

use std::sync::Arc;

use sonique_client::admin::BatchOutcome;
use sonique_client::{ApiError, ByteStream, MarketplaceApi};
use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::forms::{CategoryForm, RejectionForm, SoundForm};
use sonique_core::likes::LikeToggle;
use sonique_core::models::{
    ArtistRevenue, Category, Certificate, CertificationStats, Clip, Competition, ContentAnalytics,
    Event, GlobalAnalytics, PaymentStats, Sound, Transaction, TrendSeries, UserAnalytics,
};
use sonique_core::moderation::BatchAction;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::admin::{AnalyticsSource, CategoryAdminSource, CertificationSource, PaymentSource};
use crate::download::{DownloadSource, DownloadTarget};
use crate::edit_sound::SoundEditSource;
use crate::events::EventSource;
use crate::likes::{LikeSource, LikeTarget};
use crate::loader::ListSource;
use crate::moderation::{ClipModerationSource, SoundModerationSource};

// ---------------------------------------------------------------------------
// Catalog lists
// ---------------------------------------------------------------------------

/// `GET /api/sounds` with the list filter.
#[derive(Debug, Clone)]
pub struct CatalogSounds(pub Arc<MarketplaceApi>);

impl ListSource<Sound> for CatalogSounds {
    async fn fetch(&self, filter: &FilterState, token: Option<&BearerToken>) -> Result<Page<Sound>, ApiError> {
        self.0.list_sounds(filter, token).await
    }
}

/// Sounds of one category page.
#[derive(Debug, Clone)]
pub struct CategorySounds {
    pub api: Arc<MarketplaceApi>,
    pub category_id: DbId,
}

impl ListSource<Sound> for CategorySounds {
    async fn fetch(&self, filter: &FilterState, token: Option<&BearerToken>) -> Result<Page<Sound>, ApiError> {
        self.api.category_sounds(self.category_id, filter, token).await
    }
}

// ---------------------------------------------------------------------------
// Likes and downloads
// ---------------------------------------------------------------------------

impl LikeSource for MarketplaceApi {
    async fn toggle_like(&self, token: &BearerToken, target: LikeTarget, id: DbId) -> Result<LikeToggle, ApiError> {
        match target {
            LikeTarget::Sound => self.toggle_sound_like(token, id).await,
            LikeTarget::Clip => self.toggle_clip_like(token, id).await,
        }
    }
}

impl DownloadSource for MarketplaceApi {
    async fn open_download(&self, token: &BearerToken, target: DownloadTarget) -> Result<ByteStream, ApiError> {
        match target {
            DownloadTarget::Sound(id) => self.download_sound(token, id).await,
            DownloadTarget::Certificate(sound_id) => self.certificate_pdf(token, sound_id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

impl SoundModerationSource for MarketplaceApi {
    async fn moderation_sounds(&self, token: &BearerToken, filter: &FilterState) -> Result<Page<Sound>, ApiError> {
        self.admin_list_sounds(token, filter).await
    }

    async fn approve_sound(&self, token: &BearerToken, id: DbId) -> Result<Option<Sound>, ApiError> {
        MarketplaceApi::approve_sound(self, token, id).await
    }

    async fn reject_sound(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Sound>, ApiError> {
        MarketplaceApi::reject_sound(self, token, id, form).await
    }

    async fn delete_sound(&self, token: &BearerToken, id: DbId) -> Result<(), ApiError> {
        MarketplaceApi::delete_sound(self, token, id).await
    }
}

impl ClipModerationSource for MarketplaceApi {
    async fn moderation_clips(&self, token: &BearerToken, filter: &FilterState) -> Result<Page<Clip>, ApiError> {
        self.admin_list_clips(token, filter).await
    }

    async fn approve_clip(&self, token: &BearerToken, id: DbId) -> Result<Option<Clip>, ApiError> {
        MarketplaceApi::approve_clip(self, token, id).await
    }

    async fn reject_clip(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Clip>, ApiError> {
        MarketplaceApi::reject_clip(self, token, id, form).await
    }

    async fn toggle_featured(&self, token: &BearerToken, id: DbId) -> Result<Option<Clip>, ApiError> {
        self.toggle_clip_featured(token, id).await
    }

    async fn batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, ApiError> {
        self.clips_batch_action(token, ids, action, reason).await
    }
}

// ---------------------------------------------------------------------------
// Admin dashboards
// ---------------------------------------------------------------------------

impl CategoryAdminSource for MarketplaceApi {
    async fn admin_categories(&self, token: &BearerToken) -> Result<Vec<Category>, ApiError> {
        self.admin_list_categories(token).await
    }

    async fn create_category(&self, token: &BearerToken, form: &CategoryForm) -> Result<Category, ApiError> {
        MarketplaceApi::create_category(self, token, form).await
    }

    async fn update_category(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        MarketplaceApi::update_category(self, token, id, form).await
    }

    async fn delete_category(&self, token: &BearerToken, id: DbId) -> Result<(), ApiError> {
        MarketplaceApi::delete_category(self, token, id).await
    }

    async fn toggle_category_active(&self, token: &BearerToken, id: DbId) -> Result<Option<Category>, ApiError> {
        MarketplaceApi::toggle_category_active(self, token, id).await
    }
}

impl PaymentSource for MarketplaceApi {
    async fn payment_stats(&self, token: &BearerToken) -> Result<PaymentStats, ApiError> {
        MarketplaceApi::payment_stats(self, token).await
    }

    async fn list_transactions(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> Result<Page<Transaction>, ApiError> {
        MarketplaceApi::list_transactions(self, token, filter).await
    }

    async fn artist_revenues(&self, token: &BearerToken) -> Result<Vec<ArtistRevenue>, ApiError> {
        MarketplaceApi::artist_revenues(self, token).await
    }

    async fn approve_transaction(&self, token: &BearerToken, id: DbId) -> Result<Option<Transaction>, ApiError> {
        MarketplaceApi::approve_transaction(self, token, id).await
    }

    async fn reject_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Transaction>, ApiError> {
        MarketplaceApi::reject_transaction(self, token, id, form).await
    }

    async fn refund_transaction(&self, token: &BearerToken, id: DbId) -> Result<Option<Transaction>, ApiError> {
        MarketplaceApi::refund_transaction(self, token, id).await
    }

    async fn payments_batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, ApiError> {
        MarketplaceApi::payments_batch_action(self, token, ids, action, reason).await
    }
}

impl AnalyticsSource for MarketplaceApi {
    async fn analytics_global(&self, token: &BearerToken) -> Result<GlobalAnalytics, ApiError> {
        MarketplaceApi::analytics_global(self, token).await
    }

    async fn analytics_users(&self, token: &BearerToken) -> Result<UserAnalytics, ApiError> {
        MarketplaceApi::analytics_users(self, token).await
    }

    async fn analytics_content(&self, token: &BearerToken) -> Result<ContentAnalytics, ApiError> {
        MarketplaceApi::analytics_content(self, token).await
    }

    async fn analytics_trends(&self, token: &BearerToken) -> Result<TrendSeries, ApiError> {
        MarketplaceApi::analytics_trends(self, token).await
    }
}

impl CertificationSource for MarketplaceApi {
    async fn certification_stats(&self, token: &BearerToken) -> Result<CertificationStats, ApiError> {
        MarketplaceApi::certification_stats(self, token).await
    }

    async fn certificate(&self, token: &BearerToken, sound_id: DbId) -> Result<Certificate, ApiError> {
        MarketplaceApi::certificate(self, token, sound_id).await
    }
}

// ---------------------------------------------------------------------------
// Edit form and events
// ---------------------------------------------------------------------------

impl SoundEditSource for MarketplaceApi {
    async fn get_sound(&self, token: &BearerToken, id: DbId) -> Result<Sound, ApiError> {
        MarketplaceApi::get_sound(self, id, Some(token)).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        MarketplaceApi::list_categories(self).await
    }

    async fn update_sound(&self, token: &BearerToken, id: DbId, form: &SoundForm) -> Result<Sound, ApiError> {
        MarketplaceApi::update_sound(self, token, id, form).await
    }
}

impl EventSource for MarketplaceApi {
    async fn list_events(&self, filter: &FilterState) -> Result<Page<Event>, ApiError> {
        MarketplaceApi::list_events(self, filter).await
    }

    async fn get_event(&self, id: DbId) -> Result<Event, ApiError> {
        MarketplaceApi::get_event(self, id).await
    }

    async fn register_for_event(&self, token: &BearerToken, id: DbId) -> Result<Option<Event>, ApiError> {
        MarketplaceApi::register_for_event(self, token, id).await
    }

    async fn list_competitions(&self, filter: &FilterState) -> Result<Page<Competition>, ApiError> {
        MarketplaceApi::list_competitions(self, filter).await
    }

    async fn get_competition(&self, id: DbId) -> Result<Competition, ApiError> {
        MarketplaceApi::get_competition(self, id).await
    }
}
