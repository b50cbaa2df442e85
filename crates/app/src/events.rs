//! Events and competitions pages.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::envelope::Page;
use sonique_core::error::CoreError;
use sonique_core::filter::FilterState;
use sonique_core::models::{Competition, Event};
use sonique_core::session::BearerToken;
use sonique_core::types::{DbId, Timestamp};

use crate::context::AppContext;
use crate::error::AppError;
use crate::loader::{FilteredList, ListSource};

pub trait EventSource: Send + Sync + 'static {
    fn list_events(
        &self,
        filter: &FilterState,
    ) -> impl Future<Output = Result<Page<Event>, ApiError>> + Send;

    fn get_event(&self, id: DbId) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn register_for_event(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Event>, ApiError>> + Send;

    fn list_competitions(
        &self,
        filter: &FilterState,
    ) -> impl Future<Output = Result<Page<Competition>, ApiError>> + Send;

    fn get_competition(&self, id: DbId) -> impl Future<Output = Result<Competition, ApiError>> + Send;
}

pub struct EventList<S>(Arc<S>);

impl<S: EventSource> ListSource<Event> for EventList<S> {
    async fn fetch(&self, filter: &FilterState, _token: Option<&BearerToken>) -> Result<Page<Event>, ApiError> {
        self.0.list_events(filter).await
    }
}

pub struct CompetitionList<S>(Arc<S>);

impl<S: EventSource> ListSource<Competition> for CompetitionList<S> {
    async fn fetch(
        &self,
        filter: &FilterState,
        _token: Option<&BearerToken>,
    ) -> Result<Page<Competition>, ApiError> {
        self.0.list_competitions(filter).await
    }
}

pub struct EventsPage<S: EventSource> {
    ctx: AppContext,
    source: Arc<S>,
    events: FilteredList<Event, EventList<S>>,
    competitions: FilteredList<Competition, CompetitionList<S>>,
    selected: RwLock<Option<Event>>,
}

impl<S: EventSource> EventsPage<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        Self {
            events: FilteredList::new(EventList(Arc::clone(&source)), ctx.clone()),
            competitions: FilteredList::new(CompetitionList(Arc::clone(&source)), ctx.clone()),
            ctx,
            source,
            selected: RwLock::new(None),
        }
    }

    pub fn events(&self) -> &FilteredList<Event, EventList<S>> {
        &self.events
    }

    pub fn competitions(&self) -> &FilteredList<Competition, CompetitionList<S>> {
        &self.competitions
    }

    pub async fn selected(&self) -> Option<Event> {
        self.selected.read().await.clone()
    }

    pub async fn open_event(&self, id: DbId) -> Result<Event, AppError> {
        match self.source.get_event(id).await {
            Ok(event) => {
                *self.selected.write().await = Some(event.clone());
                Ok(event)
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    pub async fn open_competition(&self, id: DbId) -> Result<Competition, AppError> {
        match self.source.get_competition(id).await {
            Ok(competition) => Ok(competition),
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    /// Register for an event. Full or finished events are refused before
    /// any request; `now` is the caller's clock.
    pub async fn register(&self, id: DbId, now: Timestamp) -> Result<Event, AppError> {
        let token = self.ctx.require_token().await?;

        let known = match self.selected().await.filter(|e| e.id == id) {
            Some(event) => Some(event),
            None => self.events.find(id).await,
        };
        if let Some(event) = &known {
            let refusal = if event.is_full() {
                Some("Cet événement est complet")
            } else if event.has_ended(now) {
                Some("Cet événement est terminé")
            } else {
                None
            };
            if let Some(message) = refusal {
                return Err(self
                    .ctx
                    .report(AppError::Core(CoreError::Conflict(message.to_string())))
                    .await);
            }
        }

        let updated = match self.source.register_for_event(&token, id).await {
            Ok(Some(event)) => event,
            Ok(None) => match self.source.get_event(id).await {
                Ok(event) => event,
                Err(e) => return Err(self.ctx.report(AppError::Api(e)).await),
            },
            Err(e) => return Err(self.ctx.report(AppError::Api(e)).await),
        };

        self.events
            .update_items(|items| {
                if let Some(row) = items.iter_mut().find(|e| e.id == id) {
                    *row = updated.clone();
                }
            })
            .await;
        {
            let mut selected = self.selected.write().await;
            if selected.as_ref().is_some_and(|e| e.id == id) {
                *selected = Some(updated.clone());
            }
        }
        tracing::info!(event_id = id, remaining = ?updated.remaining_capacity(), "Registered for event");
        self.ctx.toasts.success("Inscription confirmée").await;
        Ok(updated)
    }
}
