//! Clip moderation page.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use sonique_client::admin::BatchOutcome;
use sonique_client::ApiError;
use sonique_core::envelope::Page;
use sonique_core::filter::{FilterChange, FilterState};
use sonique_core::forms::RejectionForm;
use sonique_core::models::Clip;
use sonique_core::moderation::{clip_counts, BatchAction};
use sonique_core::session::BearerToken;
use sonique_core::status::ClipStatus;
use sonique_core::types::DbId;

use super::missing_token;
use crate::context::AppContext;
use crate::error::AppError;
use crate::loader::{FilteredList, ListSource, LoadOutcome};

pub trait ClipModerationSource: Send + Sync + 'static {
    fn moderation_clips(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> impl Future<Output = Result<Page<Clip>, ApiError>> + Send;

    fn approve_clip(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Clip>, ApiError>> + Send;

    fn reject_clip(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> impl Future<Output = Result<Option<Clip>, ApiError>> + Send;

    fn toggle_featured(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Clip>, ApiError>> + Send;

    fn batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> impl Future<Output = Result<BatchOutcome, ApiError>> + Send;
}

pub struct ModerationClips<S>(Arc<S>);

impl<S: ClipModerationSource> ListSource<Clip> for ModerationClips<S> {
    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> Result<Page<Clip>, ApiError> {
        let token = token.ok_or_else(missing_token)?;
        self.0.moderation_clips(token, filter).await
    }
}

pub struct ClipModeration<S: ClipModerationSource> {
    ctx: AppContext,
    source: Arc<S>,
    list: FilteredList<Clip, ModerationClips<S>>,
}

impl<S: ClipModerationSource> ClipModeration<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        let list = FilteredList::new(ModerationClips(Arc::clone(&source)), ctx.clone());
        Self { ctx, source, list }
    }

    pub fn list(&self) -> &FilteredList<Clip, ModerationClips<S>> {
        &self.list
    }

    pub async fn load(&self) -> Result<LoadOutcome, AppError> {
        self.list.reload().await
    }

    pub async fn filter_status(&self, status: impl Into<String>) -> Result<LoadOutcome, AppError> {
        self.list.change(FilterChange::Status(status.into())).await
    }

    pub async fn counts(&self) -> BTreeMap<&'static str, usize> {
        self.list.with_items(clip_counts).await
    }

    pub async fn approve(&self, id: DbId) -> Result<(), AppError> {
        let token = self.ctx.require_admin().await?;
        let updated = self
            .source
            .approve_clip(&token, id)
            .await
            .map_err(AppError::Api);
        let updated = self.settle(updated).await?;
        self.apply(id, updated, |clip| clip.status = ClipStatus::Published).await;
        self.ctx.toasts.success("Clip publié").await;
        Ok(())
    }

    pub async fn reject(&self, id: DbId, form: &RejectionForm) -> Result<(), AppError> {
        form.check().map_err(AppError::Invalid)?;
        let token = self.ctx.require_admin().await?;
        let updated = self
            .source
            .reject_clip(&token, id, form)
            .await
            .map_err(AppError::Api);
        let updated = self.settle(updated).await?;
        let reason = form.reason.trim().to_string();
        self.apply(id, updated, move |clip| {
            clip.status = ClipStatus::Rejected;
            clip.rejection_reason = Some(reason);
        })
        .await;
        self.ctx.toasts.success("Clip rejeté").await;
        Ok(())
    }

    pub async fn toggle_featured(&self, id: DbId) -> Result<(), AppError> {
        let token = self.ctx.require_admin().await?;
        let updated = self
            .source
            .toggle_featured(&token, id)
            .await
            .map_err(AppError::Api);
        let updated = self.settle(updated).await?;
        self.apply(id, updated, |clip| clip.is_featured = !clip.is_featured)
            .await;
        Ok(())
    }

    /// Apply `action` to `ids`. Destructive actions ask for confirmation
    /// and reject needs a reason, both before any request.
    pub async fn batch(
        &self,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, AppError> {
        if ids.is_empty() {
            return Ok(BatchOutcome { affected: 0 });
        }
        if action.needs_reason() {
            reason
                .unwrap_or(&RejectionForm::default())
                .check()
                .map_err(AppError::Invalid)?;
        }
        if action.is_destructive() {
            self.ctx
                .confirm(&format!("Appliquer « {} » à {} clip(s) ?", action.as_str(), ids.len()))?;
        }
        let token = self.ctx.require_admin().await?;

        let outcome = self
            .source
            .batch_action(&token, ids, action, reason)
            .await
            .map_err(AppError::Api);
        let outcome = self.settle(outcome).await?;

        let selected: HashSet<DbId> = ids.iter().copied().collect();
        let reason_text = reason.map(|r| r.reason.trim().to_string());
        self.list
            .update_items(|items| match action {
                BatchAction::Delete => items.retain(|c| !selected.contains(&c.id)),
                _ => {
                    for clip in items.iter_mut().filter(|c| selected.contains(&c.id)) {
                        if let Some(status) = action.resulting_clip_status() {
                            clip.status = status;
                        }
                        match action {
                            BatchAction::Feature => clip.is_featured = true,
                            BatchAction::Unfeature => clip.is_featured = false,
                            BatchAction::Reject => clip.rejection_reason = reason_text.clone(),
                            _ => {}
                        }
                    }
                }
            })
            .await;

        tracing::info!(action = action.as_str(), affected = outcome.affected, "Clip batch applied");
        self.ctx
            .toasts
            .success(format!("{} clip(s) mis à jour", outcome.affected))
            .await;
        Ok(outcome)
    }

    async fn settle<R>(&self, result: Result<R, AppError>) -> Result<R, AppError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.ctx.report(err).await),
        }
    }

    async fn apply(&self, id: DbId, updated: Option<Clip>, fallback: impl FnOnce(&mut Clip)) {
        self.list
            .update_items(|items| {
                if let Some(row) = items.iter_mut().find(|c| c.id == id) {
                    match updated {
                        Some(clip) => *row = clip,
                        None => fallback(row),
                    }
                }
            })
            .await;
    }
}
