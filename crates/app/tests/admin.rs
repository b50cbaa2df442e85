mod common;

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use serde_json::json;

use sonique_app::admin::{AnalyticsDashboard, AnalyticsSource, CategoryAdmin, CategoryAdminSource, PaymentSource, PaymentsAdmin};
use sonique_app::toast::ToastKind;
use sonique_app::AppError;
use sonique_client::admin::BatchOutcome;
use sonique_client::ApiError;
use sonique_core::envelope::{FieldErrors, Page};
use sonique_core::error::CoreError;
use sonique_core::filter::FilterState;
use sonique_core::forms::{CategoryForm, RejectionForm};
use sonique_core::models::{
    ArtistRevenue, Category, ContentAnalytics, GlobalAnalytics, PaymentStats, Transaction, TrendSeries, UserAnalytics,
};
use sonique_core::moderation::BatchAction;
use sonique_core::session::BearerToken;
use sonique_core::status::TransactionStatus;
use sonique_core::types::DbId;

use common::{admin_ctx, page, Calls};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn category(id: DbId, name: &str, sort_order: i32) -> Category {
    serde_json::from_value(json!({"id": id, "name": name, "sort_order": sort_order})).unwrap()
}

#[derive(Default)]
struct CategoryBackend {
    calls: Calls,
    taken_names: Vec<String>,
}

impl CategoryAdminSource for CategoryBackend {
    async fn admin_categories(&self, _token: &BearerToken) -> Result<Vec<Category>, ApiError> {
        self.calls.record("list");
        Ok(vec![category(1, "Rap", 2), category(2, "Afrobeat", 1)])
    }

    async fn create_category(&self, _token: &BearerToken, form: &CategoryForm) -> Result<Category, ApiError> {
        self.calls.record("create");
        if self.taken_names.iter().any(|n| n == form.name.trim()) {
            let mut errors = FieldErrors::new();
            errors.add("name", "Ce nom est déjà utilisé");
            return Err(ApiError::Http {
                status: 422,
                message: "The given data was invalid.".into(),
                errors,
            });
        }
        Ok(category(3, form.name.trim(), form.sort_order))
    }

    async fn update_category(&self, _token: &BearerToken, id: DbId, form: &CategoryForm) -> Result<Category, ApiError> {
        self.calls.record(format!("update:{id}"));
        Ok(category(id, form.name.trim(), form.sort_order))
    }

    async fn delete_category(&self, _token: &BearerToken, id: DbId) -> Result<(), ApiError> {
        self.calls.record(format!("delete:{id}"));
        Ok(())
    }

    async fn toggle_category_active(&self, _token: &BearerToken, id: DbId) -> Result<Option<Category>, ApiError> {
        self.calls.record(format!("toggle:{id}"));
        Ok(None)
    }
}

fn names(categories: &[Category]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

#[tokio::test]
async fn categories_load_in_display_order() {
    let admin = CategoryAdmin::new(admin_ctx(), Arc::new(CategoryBackend::default()));
    assert_eq!(admin.load().await.unwrap(), 2);
    assert_eq!(names(&admin.categories().await), vec!["Afrobeat", "Rap"]);
}

#[tokio::test]
async fn invalid_category_form_is_not_sent() {
    let backend = Arc::new(CategoryBackend::default());
    let admin = CategoryAdmin::new(admin_ctx(), Arc::clone(&backend));

    let form = CategoryForm {
        name: "  ".into(),
        color: "vert".into(),
        ..CategoryForm::default()
    };
    assert_matches!(admin.save(None, &form).await, Err(AppError::Invalid(_)));

    let errors = admin.form_errors().await;
    assert!(errors.contains("name"));
    assert!(errors.contains("color"));
    assert_eq!(backend.calls.count("create"), 0);
}

#[tokio::test]
async fn server_errors_fill_the_modal() {
    let backend = Arc::new(CategoryBackend {
        taken_names: vec!["Makossa".into()],
        ..CategoryBackend::default()
    });
    let admin = CategoryAdmin::new(admin_ctx(), Arc::clone(&backend));
    let form = CategoryForm {
        name: "Makossa".into(),
        ..CategoryForm::default()
    };

    assert_matches!(admin.save(None, &form).await, Err(AppError::Api(_)));
    assert_eq!(admin.form_errors().await.first("name"), Some("Ce nom est déjà utilisé"));
}

#[tokio::test]
async fn created_and_updated_categories_stay_sorted() {
    let admin = CategoryAdmin::new(admin_ctx(), Arc::new(CategoryBackend::default()));
    admin.load().await.unwrap();

    let created = CategoryForm {
        name: "Bikutsi".into(),
        sort_order: 0,
        ..CategoryForm::default()
    };
    admin.save(None, &created).await.unwrap();
    assert_eq!(names(&admin.categories().await), vec!["Bikutsi", "Afrobeat", "Rap"]);

    let renamed = CategoryForm {
        name: "Hip-hop".into(),
        sort_order: 5,
        ..CategoryForm::default()
    };
    admin.save(Some(1), &renamed).await.unwrap();
    assert_eq!(names(&admin.categories().await), vec!["Bikutsi", "Afrobeat", "Hip-hop"]);
    assert!(admin.form_errors().await.is_empty());
}

#[tokio::test]
async fn toggle_flips_active_flag_locally() {
    let admin = CategoryAdmin::new(admin_ctx(), Arc::new(CategoryBackend::default()));
    admin.load().await.unwrap();

    admin.toggle_active(2).await.unwrap();
    let categories = admin.categories().await;
    assert!(!categories.iter().find(|c| c.id == 2).unwrap().is_active);
    assert!(categories.iter().find(|c| c.id == 1).unwrap().is_active);
}

#[tokio::test]
async fn toggle_of_unlisted_category_sends_nothing() {
    let backend = Arc::new(CategoryBackend::default());
    let admin = CategoryAdmin::new(admin_ctx(), backend.clone());

    let err = admin.toggle_active(2).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::NotLoaded { id: 2, .. }));
    assert_eq!(backend.calls.count("toggle"), 0);
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

fn transaction(id: DbId, status: &str) -> Transaction {
    serde_json::from_value(json!({"id": id, "amount": "1500", "status": status})).unwrap()
}

#[derive(Default)]
struct PaymentBackend {
    calls: Calls,
    last_filter: Mutex<Option<FilterState>>,
}

impl PaymentSource for PaymentBackend {
    async fn payment_stats(&self, _token: &BearerToken) -> Result<PaymentStats, ApiError> {
        self.calls.record("stats");
        Ok(PaymentStats {
            total_revenue: 4500.0,
            completed_count: 2,
            ..PaymentStats::default()
        })
    }

    async fn list_transactions(&self, _token: &BearerToken, filter: &FilterState) -> Result<Page<Transaction>, ApiError> {
        self.calls.record("list");
        *self.last_filter.lock().unwrap() = Some(filter.clone());
        Ok(page(
            vec![transaction(1, "completed"), transaction(2, "pending"), transaction(3, "completed")],
            1,
            1,
        ))
    }

    async fn artist_revenues(&self, _token: &BearerToken) -> Result<Vec<ArtistRevenue>, ApiError> {
        self.calls.record("revenues");
        Err(ApiError::application("Revenus indisponibles"))
    }

    async fn approve_transaction(&self, _token: &BearerToken, id: DbId) -> Result<Option<Transaction>, ApiError> {
        self.calls.record(format!("approve:{id}"));
        Ok(None)
    }

    async fn reject_transaction(
        &self,
        _token: &BearerToken,
        id: DbId,
        _form: &RejectionForm,
    ) -> Result<Option<Transaction>, ApiError> {
        self.calls.record(format!("reject:{id}"));
        Ok(None)
    }

    async fn refund_transaction(&self, _token: &BearerToken, id: DbId) -> Result<Option<Transaction>, ApiError> {
        self.calls.record(format!("refund:{id}"));
        Ok(Some(transaction(id, "refunded")))
    }

    async fn payments_batch_action(
        &self,
        _token: &BearerToken,
        ids: &[DbId],
        action: BatchAction,
        _reason: Option<&RejectionForm>,
    ) -> Result<BatchOutcome, ApiError> {
        self.calls.record(format!("batch:{}", action.as_str()));
        Ok(BatchOutcome {
            affected: ids.len() as u64,
        })
    }
}

async fn tx_status(admin: &PaymentsAdmin<PaymentBackend>, id: DbId) -> TransactionStatus {
    admin.transactions().find(id).await.unwrap().status
}

#[tokio::test]
async fn payments_load_parts_independently() {
    let ctx = admin_ctx();
    let backend = Arc::new(PaymentBackend::default());
    let admin = PaymentsAdmin::new(ctx.clone(), Arc::clone(&backend));

    admin.load().await.unwrap();

    assert_eq!(admin.stats().await.unwrap().completed_count, 2);
    assert_eq!(admin.transactions().len().await, 3);
    assert!(admin.revenues().await.is_empty());
    assert_eq!(ctx.toasts.count(ToastKind::Error).await, 1);
}

#[tokio::test]
async fn refund_requires_a_completed_transaction() {
    let backend = Arc::new(PaymentBackend::default());
    let admin = PaymentsAdmin::new(admin_ctx(), Arc::clone(&backend));
    admin.load().await.unwrap();

    let err = admin.refund(2).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));
    assert_eq!(backend.calls.count("refund"), 0);

    admin.refund(1).await.unwrap();
    assert_eq!(backend.calls.count("refund:1"), 1);
    assert_eq!(tx_status(&admin, 1).await, TransactionStatus::Refunded);
}

#[tokio::test]
async fn batch_approve_updates_selected_rows() {
    let backend = Arc::new(PaymentBackend::default());
    let admin = PaymentsAdmin::new(admin_ctx(), Arc::clone(&backend));
    admin.load().await.unwrap();

    let outcome = admin.batch(&[2], BatchAction::Approve, None).await.unwrap();
    assert_eq!(outcome.affected, 1);
    assert_eq!(tx_status(&admin, 2).await, TransactionStatus::Completed);
}

#[tokio::test]
async fn status_filter_is_forwarded() {
    let backend = Arc::new(PaymentBackend::default());
    let admin = PaymentsAdmin::new(admin_ctx(), Arc::clone(&backend));

    admin.filter_status("pending").await.unwrap();
    let filter = backend.last_filter.lock().unwrap().clone().unwrap();
    assert_eq!(filter.query_pairs(), vec![("status", "pending".to_string())]);
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Every section loads except the trends.
struct PartialAnalytics;

impl AnalyticsSource for PartialAnalytics {
    async fn analytics_global(&self, _token: &BearerToken) -> Result<GlobalAnalytics, ApiError> {
        Ok(GlobalAnalytics {
            total_users: 120,
            ..GlobalAnalytics::default()
        })
    }

    async fn analytics_users(&self, _token: &BearerToken) -> Result<UserAnalytics, ApiError> {
        Ok(UserAnalytics::default())
    }

    async fn analytics_content(&self, _token: &BearerToken) -> Result<ContentAnalytics, ApiError> {
        Ok(ContentAnalytics::default())
    }

    async fn analytics_trends(&self, _token: &BearerToken) -> Result<TrendSeries, ApiError> {
        Err(ApiError::application("Tendances indisponibles"))
    }
}

#[tokio::test]
async fn one_failing_section_does_not_block_the_others() {
    let ctx = admin_ctx();
    let dashboard = AnalyticsDashboard::new(ctx.clone(), Arc::new(PartialAnalytics));

    let summary = dashboard.refresh().await.unwrap();
    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.failed, 1);

    assert_eq!(dashboard.global().await.data.unwrap().total_users, 120);
    let trends = dashboard.trends().await;
    assert!(trends.data.is_none());
    assert!(!trends.loading);
    assert_eq!(trends.error.as_deref(), Some("Tendances indisponibles"));
    assert_eq!(
        ctx.toasts.last().await.map(|t| t.message),
        Some("Tendances indisponibles".to_string())
    );
}
