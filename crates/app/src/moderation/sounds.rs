//! Sound moderation page.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use sonique_client::ApiError;
use sonique_core::envelope::Page;
use sonique_core::filter::{FilterChange, FilterState};
use sonique_core::forms::RejectionForm;
use sonique_core::models::Sound;
use sonique_core::moderation::sound_buckets;
use sonique_core::session::BearerToken;
use sonique_core::status::SoundStatus;
use sonique_core::types::DbId;

use super::missing_token;
use crate::context::AppContext;
use crate::error::AppError;
use crate::loader::{FilteredList, ListSource, LoadOutcome};

pub trait SoundModerationSource: Send + Sync + 'static {
    fn moderation_sounds(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> impl Future<Output = Result<Page<Sound>, ApiError>> + Send;

    fn approve_sound(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Sound>, ApiError>> + Send;

    fn reject_sound(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> impl Future<Output = Result<Option<Sound>, ApiError>> + Send;

    fn delete_sound(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// List adapter over the moderation source.
pub struct ModerationSounds<S>(Arc<S>);

impl<S: SoundModerationSource> ListSource<Sound> for ModerationSounds<S> {
    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> Result<Page<Sound>, ApiError> {
        let token = token.ok_or_else(missing_token)?;
        self.0.moderation_sounds(token, filter).await
    }
}

pub struct SoundModeration<S: SoundModerationSource> {
    ctx: AppContext,
    source: Arc<S>,
    list: FilteredList<Sound, ModerationSounds<S>>,
}

impl<S: SoundModerationSource> SoundModeration<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        let list = FilteredList::new(ModerationSounds(Arc::clone(&source)), ctx.clone());
        Self { ctx, source, list }
    }

    pub fn list(&self) -> &FilteredList<Sound, ModerationSounds<S>> {
        &self.list
    }

    pub async fn load(&self) -> Result<LoadOutcome, AppError> {
        self.list.reload().await
    }

    pub async fn filter_status(&self, status: impl Into<String>) -> Result<LoadOutcome, AppError> {
        self.list.change(FilterChange::Status(status.into())).await
    }

    /// Ids grouped by status, from the locally held list.
    pub async fn buckets(&self) -> BTreeMap<&'static str, Vec<DbId>> {
        self.list.with_items(sound_buckets).await
    }

    pub async fn approve(&self, id: DbId) -> Result<(), AppError> {
        let token = self.ctx.require_admin().await?;
        match self.source.approve_sound(&token, id).await {
            Ok(updated) => {
                self.apply(id, updated, SoundStatus::Approved, None).await;
                tracing::info!(sound_id = id, "Sound approved");
                self.ctx.toasts.success("Son approuvé").await;
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    /// Reject with a reason. An empty reason is refused locally and no
    /// request is sent.
    pub async fn reject(&self, id: DbId, form: &RejectionForm) -> Result<(), AppError> {
        form.check().map_err(AppError::Invalid)?;
        let token = self.ctx.require_admin().await?;

        match self.source.reject_sound(&token, id, form).await {
            Ok(updated) => {
                let reason = form.reason.trim().to_string();
                self.apply(id, updated, SoundStatus::Rejected, Some(reason)).await;
                tracing::info!(sound_id = id, "Sound rejected");
                self.ctx.toasts.success("Son rejeté").await;
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    /// Delete after confirmation; the row disappears locally.
    pub async fn delete(&self, id: DbId) -> Result<(), AppError> {
        self.ctx.confirm("Supprimer définitivement ce son ?")?;
        let token = self.ctx.require_admin().await?;

        match self.source.delete_sound(&token, id).await {
            Ok(()) => {
                self.list.update_items(|items| items.retain(|s| s.id != id)).await;
                tracing::info!(sound_id = id, "Sound deleted");
                self.ctx.toasts.success("Son supprimé").await;
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    /// Replace the row with the server's copy, or move it to `status`
    /// when the backend did not echo the sound.
    async fn apply(&self, id: DbId, updated: Option<Sound>, status: SoundStatus, reason: Option<String>) {
        self.list
            .update_items(|items| {
                if let Some(row) = items.iter_mut().find(|s| s.id == id) {
                    match updated {
                        Some(sound) => *row = sound,
                        None => {
                            row.status = status;
                            row.rejection_reason = reason;
                        }
                    }
                }
            })
            .await;
    }
}
