//! Payment administration endpoints.

use serde_json::json;

use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::forms::RejectionForm;
use sonique_core::models::{ArtistRevenue, PaymentStats, Transaction};
use sonique_core::moderation::BatchAction;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use super::BatchOutcome;
use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    pub async fn payment_stats(&self, token: &BearerToken) -> Result<PaymentStats, ApiError> {
        Self::send_field(self.get("/api/admin/payments/stats", Some(token)), "stats").await
    }

    pub async fn list_transactions(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> Result<Page<Transaction>, ApiError> {
        let builder = self
            .get("/api/admin/payments/transactions", Some(token))
            .query(&filter.query_pairs());
        Ok(Self::send_envelope(builder).await?.page("transactions")?)
    }

    pub async fn artist_revenues(&self, token: &BearerToken) -> Result<Vec<ArtistRevenue>, ApiError> {
        Self::send_field(
            self.get("/api/admin/payments/artist-revenues", Some(token)),
            "revenues",
        )
        .await
    }

    pub async fn approve_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Transaction>, ApiError> {
        self.transaction_action(token, id, "approve", None).await
    }

    pub async fn reject_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> Result<Option<Transaction>, ApiError> {
        self.transaction_action(token, id, "reject", Some(form)).await
    }

    pub async fn refund_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Transaction>, ApiError> {
        self.transaction_action(token, id, "refund", None).await
    }

    async fn transaction_action(
        &self,
        token: &BearerToken,
        id: DbId,
        action: &str,
        reason: Option<&RejectionForm>,
    ) -> Result<Option<Transaction>, ApiError> {
        let mut builder = self.post(
            &format!("/api/admin/payments/transactions/{id}/{action}"),
            Some(token),
        );
        if let Some(form) = reason {
            builder = builder.json(&form.to_payload());
        }
        let transaction = Self::send_field(builder, "transaction").await?;
        tracing::info!(transaction_id = id, action, "Transaction action applied");
        Ok(transaction)
    }

    pub async fn payments_batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, ApiError> {
        let body = json!({
            "ids": ids,
            "action": action.as_str(),
            "reason": reason.map(|r| r.reason.trim()),
        });
        let builder = self
            .post("/api/admin/payments/batch-action", Some(token))
            .json(&body);
        let outcome: BatchOutcome = Self::send_payload(builder).await?;
        tracing::info!(action = action.as_str(), affected = outcome.affected, "Payment batch action applied");
        Ok(outcome)
    }
}
