//! Analytics dashboard endpoints.

use sonique_core::models::{ContentAnalytics, GlobalAnalytics, TrendSeries, UserAnalytics};
use sonique_core::session::BearerToken;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    pub async fn analytics_global(&self, token: &BearerToken) -> Result<GlobalAnalytics, ApiError> {
        Self::send_field(self.get("/api/admin/analytics/global", Some(token)), "analytics").await
    }

    pub async fn analytics_users(&self, token: &BearerToken) -> Result<UserAnalytics, ApiError> {
        Self::send_field(self.get("/api/admin/analytics/users", Some(token)), "analytics").await
    }

    pub async fn analytics_content(&self, token: &BearerToken) -> Result<ContentAnalytics, ApiError> {
        Self::send_field(self.get("/api/admin/analytics/content", Some(token)), "analytics").await
    }

    pub async fn analytics_trends(&self, token: &BearerToken) -> Result<TrendSeries, ApiError> {
        Self::send_field(self.get("/api/admin/analytics/trends", Some(token)), "trends").await
    }
}
