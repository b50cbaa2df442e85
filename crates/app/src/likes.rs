//! Like/favorite toggle.
//!
//! Never speculative: the list is only touched once the backend has
//! answered with the new `{is_liked, likes_count}` pair.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
pub use sonique_core::likes::LikeTarget;
use sonique_core::likes::{LikeToggle, Likeable, LikedSet};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::error::AppError;
use crate::loader::{FilteredList, ListSource};

pub trait LikeSource: Send + Sync {
    fn toggle_like(
        &self,
        token: &BearerToken,
        target: LikeTarget,
        id: DbId,
    ) -> impl Future<Output = Result<LikeToggle, ApiError>> + Send;
}

/// Like button state for one list view of `T`. The toggle endpoint
/// follows from `T`.
pub struct LikeController<T, L> {
    ctx: AppContext,
    source: Arc<L>,
    liked: RwLock<LikedSet>,
    _items: PhantomData<fn() -> T>,
}

impl<T, L> LikeController<T, L>
where
    T: Likeable + Clone + Send + Sync + 'static,
    L: LikeSource,
{
    pub fn new(ctx: AppContext, source: Arc<L>) -> Self {
        Self {
            ctx,
            source,
            liked: RwLock::new(LikedSet::new()),
            _items: PhantomData,
        }
    }

    /// Reset the liked set from freshly loaded items.
    pub async fn seed(&self, items: &[T]) {
        *self.liked.write().await = LikedSet::from_items(items);
    }

    pub async fn is_liked(&self, id: DbId) -> bool {
        self.liked.read().await.contains(id)
    }

    pub async fn liked_count(&self) -> usize {
        self.liked.read().await.len()
    }

    /// Toggle the like on `id` and apply the server's answer to `list`.
    pub async fn toggle<S: ListSource<T>>(
        &self,
        list: &FilteredList<T, S>,
        id: DbId,
    ) -> Result<LikeToggle, AppError> {
        let state = self.send(id).await?;
        let found = list
            .update_items(|items| sonique_core::likes::apply_like(items, id, state))
            .await;
        if !found {
            tracing::debug!(id, "Liked item no longer listed");
        }
        self.liked.write().await.reconcile(id, state);
        tracing::debug!(id, is_liked = state.is_liked, likes = state.likes_count, "Like toggled");
        Ok(state)
    }

    /// Toggle an item that no list view holds, e.g. from a detail page.
    pub async fn toggle_unlisted(&self, id: DbId) -> Result<LikeToggle, AppError> {
        let state = self.send(id).await?;
        self.liked.write().await.reconcile(id, state);
        Ok(state)
    }

    async fn send(&self, id: DbId) -> Result<LikeToggle, AppError> {
        let token = self.ctx.require_token().await?;
        match self.source.toggle_like(&token, T::TARGET, id).await {
            Ok(state) => Ok(state),
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }
}
