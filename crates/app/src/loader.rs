//! Filtered-list loader.
//!
//! [`FilteredList`] owns a list view's filter, items and pagination. Every
//! filter change issues a fetch: search edits are debounced, other edits
//! fetch immediately and cancel a pending debounced fetch. Each fetch is
//! tagged with a generation number and a response is applied only if no
//! newer fetch was issued in the meantime.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::envelope::{Page, Pagination};
use sonique_core::filter::{FilterChange, FilterState};
use sonique_core::models::Identified;
use sonique_core::session::BearerToken;

use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::error::AppError;

/// A paginated list endpoint.
pub trait ListSource<T>: Send + Sync + 'static {
    /// Gated lists refuse to fetch without a session token.
    fn requires_auth(&self) -> bool {
        false
    }

    fn fetch(
        &self,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> impl Future<Output = Result<Page<T>, ApiError>> + Send;
}

/// What happened to a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Results were applied; `count` items are now listed.
    Applied { count: usize },
    /// A newer fetch superseded this one; its results were dropped.
    Stale,
    /// Nothing to load (no further page, or a load is already running).
    Skipped,
}

#[derive(Debug)]
struct ListState<T> {
    filter: FilterState,
    /// Filter that produced `items`; differs from `filter` while a search
    /// edit waits out the debounce.
    applied: FilterState,
    items: Vec<T>,
    pagination: Pagination,
    loading: bool,
    loading_more: bool,
    /// At least one fetch has completed successfully.
    loaded: bool,
}

struct ListInner<T, S> {
    source: S,
    ctx: AppContext,
    state: RwLock<ListState<T>>,
    generation: AtomicU64,
    debouncer: Debouncer,
}

/// State of one list view. Cloning shares the same list.
pub struct FilteredList<T, S> {
    inner: Arc<ListInner<T, S>>,
}

impl<T, S> Clone for FilteredList<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> FilteredList<T, S>
where
    T: Identified + Clone + Send + Sync + 'static,
    S: ListSource<T>,
{
    pub fn new(source: S, ctx: AppContext) -> Self {
        Self::with_filter(source, ctx, FilterState::default())
    }

    /// Start from a preset filter, e.g. a category page pinned to one category.
    pub fn with_filter(source: S, ctx: AppContext, filter: FilterState) -> Self {
        let debouncer = Debouncer::new(ctx.config.search_debounce);
        Self {
            inner: Arc::new(ListInner {
                source,
                ctx,
                state: RwLock::new(ListState {
                    applied: filter.clone(),
                    filter,
                    items: Vec::new(),
                    pagination: Pagination::default(),
                    loading: false,
                    loading_more: false,
                    loaded: false,
                }),
                generation: AtomicU64::new(0),
                debouncer,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Apply a filter change and schedule the matching fetch.
    ///
    /// Search edits return [`LoadOutcome::Skipped`] immediately; the
    /// debounced fetch runs in the background.
    pub async fn change(&self, change: FilterChange) -> Result<LoadOutcome, AppError> {
        let debounced = change.is_debounced();
        self.inner.state.write().await.filter.apply(change);

        if debounced {
            let inner = Arc::clone(&self.inner);
            self.inner.debouncer.schedule(async move {
                if let Err(e) = inner.reload().await {
                    tracing::debug!(error = %e, "Debounced fetch failed");
                }
            });
            return Ok(LoadOutcome::Skipped);
        }

        self.inner.debouncer.cancel();
        self.inner.reload().await
    }

    /// Fetch the current filter's first page, replacing the list.
    pub async fn reload(&self) -> Result<LoadOutcome, AppError> {
        self.inner.reload().await
    }

    /// Re-issue the current filter ("Actualiser").
    pub async fn refresh(&self) -> Result<LoadOutcome, AppError> {
        self.inner.debouncer.cancel();
        self.inner.reload().await
    }

    /// Append the next page, skipping ids already listed.
    pub async fn load_more(&self) -> Result<LoadOutcome, AppError> {
        self.inner.load_more().await
    }

    // ---- read access ----

    pub async fn items(&self) -> Vec<T> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.items.len()
    }

    pub async fn filter(&self) -> FilterState {
        self.inner.state.read().await.filter.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.inner.state.read().await.pagination.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    pub async fn is_loading_more(&self) -> bool {
        self.inner.state.read().await.loading_more
    }

    /// A load finished and returned nothing: show the empty state.
    pub async fn is_empty(&self) -> bool {
        let state = self.inner.state.read().await;
        state.loaded && state.items.is_empty()
    }

    pub async fn show_load_more(&self) -> bool {
        let state = self.inner.state.read().await;
        state.loaded && state.pagination.has_more()
    }

    pub async fn find(&self, id: sonique_core::types::DbId) -> Option<T> {
        self.inner
            .state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Inspect the items without cloning them.
    pub async fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.state.read().await.items)
    }

    /// Apply a local reducer (server truth after an action) to the items.
    pub async fn update_items<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        f(&mut self.inner.state.write().await.items)
    }
}

impl<T, S> ListInner<T, S>
where
    T: Identified + Clone + Send + Sync + 'static,
    S: ListSource<T>,
{
    async fn token(&self) -> Result<Option<BearerToken>, AppError> {
        if self.source.requires_auth() {
            self.ctx.require_token().await.map(Some)
        } else {
            Ok(self.ctx.session.token().await)
        }
    }

    async fn reload(&self) -> Result<LoadOutcome, AppError> {
        let token = self.token().await?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let filter = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.filter.clone()
        };

        tracing::debug!(generation, query = ?filter.query_pairs(), "Fetching list");
        let result = self.source.fetch(&filter, token.as_ref()).await;

        let mut state = self.state.write().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(generation, "Discarding stale list response");
            return Ok(LoadOutcome::Stale);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                state.items = page.items;
                state.pagination = page.pagination;
                state.applied = filter;
                state.loaded = true;
                Ok(LoadOutcome::Applied {
                    count: state.items.len(),
                })
            }
            Err(e) => {
                drop(state);
                Err(self.ctx.report(AppError::Api(e)).await)
            }
        }
    }

    async fn load_more(&self) -> Result<LoadOutcome, AppError> {
        let token = self.token().await?;
        let generation = self.generation.load(Ordering::SeqCst);

        let filter = {
            let mut state = self.state.write().await;
            if state.loading || state.loading_more || !state.loaded {
                return Ok(LoadOutcome::Skipped);
            }
            let Some(next) = state.pagination.next_page() else {
                return Ok(LoadOutcome::Skipped);
            };
            state.loading_more = true;
            state.applied.with_page(next)
        };

        let result = self.source.fetch(&filter, token.as_ref()).await;

        let mut state = self.state.write().await;
        state.loading_more = false;
        if generation != self.generation.load(Ordering::SeqCst) {
            tracing::debug!(generation, "Discarding stale page after filter change");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let mut seen: HashSet<_> = state.items.iter().map(Identified::id).collect();
                let fresh: Vec<T> = page
                    .items
                    .into_iter()
                    .filter(|item| seen.insert(item.id()))
                    .collect();
                tracing::debug!(appended = fresh.len(), page = filter.page, "Appended page");
                state.items.extend(fresh);
                state.pagination = page.pagination;
                Ok(LoadOutcome::Applied {
                    count: state.items.len(),
                })
            }
            Err(e) => {
                drop(state);
                Err(self.ctx.report(AppError::Api(e)).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use sonique_core::models::Sound;

    use super::*;
    use crate::config::AppConfig;
    use crate::toast::ToastKind;

    fn sound(id: i64) -> Sound {
        serde_json::from_value(serde_json::json!({"id": id, "title": format!("s{id}")})).unwrap()
    }

    /// Serves pages of `total` sounds, 20 per page.
    struct Paged {
        total: i64,
        fail: bool,
        gated: bool,
        calls: Mutex<Vec<FilterState>>,
    }

    impl Paged {
        fn new(total: i64) -> Self {
            Self {
                total,
                fail: false,
                gated: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<FilterState> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ListSource<Sound> for Paged {
        fn requires_auth(&self) -> bool {
            self.gated
        }

        async fn fetch(
            &self,
            filter: &FilterState,
            _token: Option<&BearerToken>,
        ) -> Result<Page<Sound>, ApiError> {
            self.calls.lock().unwrap().push(filter.clone());
            if self.fail {
                return Err(ApiError::application("Erreur serveur"));
            }
            let start = (i64::from(filter.page) - 1) * 20;
            let items: Vec<Sound> = (start..self.total.min(start + 20)).map(|i| sound(i + 1)).collect();
            let last_page = ((self.total + 19) / 20).max(1) as u32;
            Ok(Page::new(
                items,
                Pagination {
                    current_page: filter.page,
                    last_page,
                    per_page: 20,
                    total: self.total as u64,
                    has_more: None,
                },
            ))
        }
    }

    fn ctx() -> AppContext {
        AppContext::new(AppConfig::default())
    }

    // -- reload --

    #[tokio::test]
    async fn reload_replaces_items() {
        let list = FilteredList::new(Paged::new(3), ctx());
        assert!(!list.is_empty().await);

        let outcome = list.reload().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { count: 3 });
        assert!(!list.is_loading().await);
        assert!(!list.show_load_more().await);
    }

    #[tokio::test]
    async fn failure_keeps_previous_items_and_toasts() {
        let ctx = ctx();
        let list = FilteredList::new(Paged::new(2), ctx.clone());
        list.reload().await.unwrap();

        let failing = FilteredList::new(
            Paged {
                fail: true,
                ..Paged::new(2)
            },
            ctx.clone(),
        );
        assert_matches!(failing.reload().await, Err(AppError::Api(_)));
        assert!(!failing.is_loading().await);
        assert!(!failing.is_empty().await);
        assert_eq!(list.len().await, 2);
        assert_eq!(ctx.toasts.count(ToastKind::Error).await, 1);
    }

    #[tokio::test]
    async fn gated_list_needs_a_session() {
        let ctx = ctx();
        let source = Paged {
            gated: true,
            ..Paged::new(2)
        };
        let list = FilteredList::new(source, ctx.clone());
        assert_matches!(list.reload().await, Err(AppError::LoginRequired));
        assert!(list.source().calls().is_empty());
        assert_eq!(ctx.toasts.count(ToastKind::LoginRequired).await, 1);
    }

    // -- filter changes --

    #[tokio::test]
    async fn non_text_change_resets_page_and_fetches() {
        let list = FilteredList::new(Paged::new(45), ctx());
        list.reload().await.unwrap();
        list.load_more().await.unwrap();
        assert_eq!(list.len().await, 40);

        list.change(FilterChange::Sort("popular".into())).await.unwrap();
        let calls = list.source().calls();
        let last = calls.last().unwrap();
        assert_eq!(last.sort, "popular");
        assert_eq!(last.page, 1);
        assert_eq!(list.len().await, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn non_text_change_cancels_pending_search() {
        let list = FilteredList::new(Paged::new(5), ctx());
        list.change(FilterChange::Search("ma".into())).await.unwrap();
        list.change(FilterChange::Category("3".into())).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let calls = list.source().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].search, "ma");
        assert_eq!(calls[0].category, "3");
    }

    // -- load more --

    #[tokio::test]
    async fn load_more_skips_when_exhausted() {
        let list = FilteredList::new(Paged::new(20), ctx());
        assert_eq!(list.load_more().await.unwrap(), LoadOutcome::Skipped);
        list.reload().await.unwrap();
        assert_eq!(list.load_more().await.unwrap(), LoadOutcome::Skipped);
        assert_eq!(list.source().calls().len(), 1);
    }
}
