//! Payments administration page.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::admin::BatchOutcome;
use sonique_client::ApiError;
use sonique_core::envelope::Page;
use sonique_core::error::CoreError;
use sonique_core::filter::{FilterChange, FilterState};
use sonique_core::forms::RejectionForm;
use sonique_core::models::{ArtistRevenue, PaymentStats, Transaction};
use sonique_core::moderation::BatchAction;
use sonique_core::session::BearerToken;
use sonique_core::status::TransactionStatus;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::error::AppError;
use crate::loader::{FilteredList, ListSource, LoadOutcome};
use crate::moderation::missing_token;

pub trait PaymentSource: Send + Sync + 'static {
    fn payment_stats(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<PaymentStats, ApiError>> + Send;

    fn list_transactions(
        &self,
        token: &BearerToken,
        filter: &FilterState,
    ) -> impl Future<Output = Result<Page<Transaction>, ApiError>> + Send;

    fn artist_revenues(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<Vec<ArtistRevenue>, ApiError>> + Send;

    fn approve_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Transaction>, ApiError>> + Send;

    fn reject_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &RejectionForm,
    ) -> impl Future<Output = Result<Option<Transaction>, ApiError>> + Send;

    fn refund_transaction(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Transaction>, ApiError>> + Send;

    fn payments_batch_action(
        &self,
        token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        reason: Option<&RejectionForm>,
    ) -> impl Future<Output = Result<BatchOutcome, ApiError>> + Send;
}

pub struct Transactions<S>(Arc<S>);

impl<S: PaymentSource> ListSource<Transaction> for Transactions<S> {
    fn requires_auth(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        filter: &FilterState,
        token: Option<&BearerToken>,
    ) -> Result<Page<Transaction>, ApiError> {
        let token = token.ok_or_else(missing_token)?;
        self.0.list_transactions(token, filter).await
    }
}

pub struct PaymentsAdmin<S: PaymentSource> {
    ctx: AppContext,
    source: Arc<S>,
    transactions: FilteredList<Transaction, Transactions<S>>,
    stats: RwLock<Option<PaymentStats>>,
    revenues: RwLock<Vec<ArtistRevenue>>,
}

impl<S: PaymentSource> PaymentsAdmin<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        let transactions = FilteredList::new(Transactions(Arc::clone(&source)), ctx.clone());
        Self {
            ctx,
            source,
            transactions,
            stats: RwLock::new(None),
            revenues: RwLock::new(Vec::new()),
        }
    }

    pub fn transactions(&self) -> &FilteredList<Transaction, Transactions<S>> {
        &self.transactions
    }

    pub async fn stats(&self) -> Option<PaymentStats> {
        self.stats.read().await.clone()
    }

    pub async fn revenues(&self) -> Vec<ArtistRevenue> {
        self.revenues.read().await.clone()
    }

    /// Load stats, the transaction list and artist revenues concurrently.
    /// Each part fails independently.
    pub async fn load(&self) -> Result<(), AppError> {
        let token = self.ctx.require_admin().await?;

        let (stats, list, revenues) = futures::join!(
            self.source.payment_stats(&token),
            self.transactions.reload(),
            self.source.artist_revenues(&token),
        );

        match stats {
            Ok(stats) => *self.stats.write().await = Some(stats),
            Err(e) => {
                self.ctx.report(AppError::Api(e)).await;
            }
        }
        match revenues {
            Ok(revenues) => *self.revenues.write().await = revenues,
            Err(e) => {
                self.ctx.report(AppError::Api(e)).await;
            }
        }
        list.map(|_| ())
    }

    pub async fn filter_status(&self, status: impl Into<String>) -> Result<LoadOutcome, AppError> {
        self.transactions
            .change(FilterChange::Status(status.into()))
            .await
    }

    pub async fn approve(&self, id: DbId) -> Result<(), AppError> {
        let token = self.ctx.require_admin().await?;
        let result = self.source.approve_transaction(&token, id).await;
        self.settle(id, result, TransactionStatus::Completed, "Paiement validé")
            .await
    }

    pub async fn reject(&self, id: DbId, form: &RejectionForm) -> Result<(), AppError> {
        form.check().map_err(AppError::Invalid)?;
        let token = self.ctx.require_admin().await?;
        let result = self.source.reject_transaction(&token, id, form).await;
        self.settle(id, result, TransactionStatus::Failed, "Paiement rejeté")
            .await
    }

    /// Refund a completed transaction after confirmation.
    pub async fn refund(&self, id: DbId) -> Result<(), AppError> {
        if let Some(tx) = self.transactions.find(id).await {
            if !tx.status.is_refundable() {
                return Err(self
                    .ctx
                    .report(AppError::Core(CoreError::Conflict(format!(
                        "transaction {id} is {} and cannot be refunded",
                        tx.status.as_str()
                    ))))
                    .await);
            }
        }
        self.ctx.confirm("Rembourser cette transaction ?")?;
        let token = self.ctx.require_admin().await?;
        let result = self.source.refund_transaction(&token, id).await;
        self.settle(id, result, TransactionStatus::Refunded, "Transaction remboursée")
            .await
    }

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
            self.ctx.confirm(&format!(
                "Appliquer « {} » à {} transaction(s) ?",
                action.as_str(),
                ids.len()
            ))?;
        }
        let token = self.ctx.require_admin().await?;

        let outcome = match self
            .source
            .payments_batch_action(&token, ids, action, reason)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.ctx.report(AppError::Api(e)).await),
        };

        if let Some(status) = action.resulting_transaction_status() {
            let selected: HashSet<DbId> = ids.iter().copied().collect();
            self.transactions
                .update_items(|items| {
                    for tx in items.iter_mut().filter(|t| selected.contains(&t.id)) {
                        tx.status = status;
                    }
                })
                .await;
        }
        tracing::info!(action = action.as_str(), affected = outcome.affected, "Payment batch applied");
        self.ctx
            .toasts
            .success(format!("{} transaction(s) mises à jour", outcome.affected))
            .await;
        Ok(outcome)
    }

    async fn settle(
        &self,
        id: DbId,
        result: Result<Option<Transaction>, ApiError>,
        status: TransactionStatus,
        message: &str,
    ) -> Result<(), AppError> {
        match result {
            Ok(updated) => {
                self.transactions
                    .update_items(|items| {
                        if let Some(row) = items.iter_mut().find(|t| t.id == id) {
                            match updated {
                                Some(tx) => *row = tx,
                                None => row.status = status,
                            }
                        }
                    })
                    .await;
                tracing::info!(transaction_id = id, status = status.as_str(), "Transaction updated");
                self.ctx.toasts.success(message).await;
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }
}
