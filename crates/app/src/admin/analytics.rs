//! Analytics dashboard.
//!
//! The four sections load concurrently and independently: one failing
//! section keeps its previous data and does not block the others.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::models::{ContentAnalytics, GlobalAnalytics, TrendSeries, UserAnalytics};
use sonique_core::session::BearerToken;

use crate::context::AppContext;
use crate::error::AppError;

pub trait AnalyticsSource: Send + Sync + 'static {
    fn analytics_global(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<GlobalAnalytics, ApiError>> + Send;

    fn analytics_users(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<UserAnalytics, ApiError>> + Send;

    fn analytics_content(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<ContentAnalytics, ApiError>> + Send;

    fn analytics_trends(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<TrendSeries, ApiError>> + Send;
}

/// One dashboard panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Section<T> {
    fn settle(&mut self, result: Result<T, ApiError>) -> bool {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.user_message());
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct Panels {
    global: Section<GlobalAnalytics>,
    users: Section<UserAnalytics>,
    content: Section<ContentAnalytics>,
    trends: Section<TrendSeries>,
}

/// How many sections a refresh loaded and how many failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub loaded: usize,
    pub failed: usize,
}

pub struct AnalyticsDashboard<S> {
    ctx: AppContext,
    source: Arc<S>,
    panels: RwLock<Panels>,
}

impl<S: AnalyticsSource> AnalyticsDashboard<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        Self {
            ctx,
            source,
            panels: RwLock::new(Panels::default()),
        }
    }

    pub async fn global(&self) -> Section<GlobalAnalytics> {
        self.panels.read().await.global.clone()
    }

    pub async fn users(&self) -> Section<UserAnalytics> {
        self.panels.read().await.users.clone()
    }

    pub async fn content(&self) -> Section<ContentAnalytics> {
        self.panels.read().await.content.clone()
    }

    pub async fn trends(&self) -> Section<TrendSeries> {
        self.panels.read().await.trends.clone()
    }

    /// Reload every section.
    pub async fn refresh(&self) -> Result<RefreshSummary, AppError> {
        let token = self.ctx.require_admin().await?;
        {
            let mut panels = self.panels.write().await;
            panels.global.loading = true;
            panels.users.loading = true;
            panels.content.loading = true;
            panels.trends.loading = true;
        }

        let (global, users, content, trends) = futures::join!(
            self.source.analytics_global(&token),
            self.source.analytics_users(&token),
            self.source.analytics_content(&token),
            self.source.analytics_trends(&token),
        );

        let first_error = [
            global.as_ref().err(),
            users.as_ref().err(),
            content.as_ref().err(),
            trends.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(ApiError::user_message)
        .next();

        let loaded = {
            let mut panels = self.panels.write().await;
            [
                panels.global.settle(global),
                panels.users.settle(users),
                panels.content.settle(content),
                panels.trends.settle(trends),
            ]
            .into_iter()
            .filter(|ok| *ok)
            .count()
        };
        let summary = RefreshSummary {
            loaded,
            failed: 4 - loaded,
        };

        if let Some(message) = first_error {
            tracing::warn!(failed = summary.failed, "Analytics refresh incomplete");
            self.ctx.toasts.error(message).await;
        }
        Ok(summary)
    }
}
