//! Category administration page.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::envelope::FieldErrors;
use sonique_core::error::CoreError;
use sonique_core::forms::CategoryForm;
use sonique_core::models::category::sort_categories;
use sonique_core::models::Category;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::error::AppError;

pub trait CategoryAdminSource: Send + Sync + 'static {
    fn admin_categories(
        &self,
        token: &BearerToken,
    ) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    fn create_category(
        &self,
        token: &BearerToken,
        form: &CategoryForm,
    ) -> impl Future<Output = Result<Category, ApiError>> + Send;

    fn update_category(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &CategoryForm,
    ) -> impl Future<Output = Result<Category, ApiError>> + Send;

    fn delete_category(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn toggle_category_active(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Category>, ApiError>> + Send;
}

#[derive(Debug, Default)]
struct CategoryState {
    categories: Vec<Category>,
    loading: bool,
    /// Errors of the create/edit modal.
    form_errors: FieldErrors,
}

pub struct CategoryAdmin<S> {
    ctx: AppContext,
    source: Arc<S>,
    state: RwLock<CategoryState>,
}

impl<S: CategoryAdminSource> CategoryAdmin<S> {
    pub fn new(ctx: AppContext, source: Arc<S>) -> Self {
        Self {
            ctx,
            source,
            state: RwLock::new(CategoryState::default()),
        }
    }

    /// Categories in display order.
    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn form_errors(&self) -> FieldErrors {
        self.state.read().await.form_errors.clone()
    }

    pub async fn load(&self) -> Result<usize, AppError> {
        let token = self.ctx.require_admin().await?;
        self.state.write().await.loading = true;

        let result = self.source.admin_categories(&token).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(mut categories) => {
                sort_categories(&mut categories);
                state.categories = categories;
                Ok(state.categories.len())
            }
            Err(e) => {
                drop(state);
                Err(self.ctx.report(AppError::Api(e)).await)
            }
        }
    }

    /// Create (`editing == None`) or update a category.
    ///
    /// Local validation failures and the backend's `errors` map both end
    /// up in [`form_errors`](Self::form_errors).
    pub async fn save(&self, editing: Option<DbId>, form: &CategoryForm) -> Result<Category, AppError> {
        if let Err(errors) = form.check() {
            self.state.write().await.form_errors = errors.clone();
            return Err(AppError::Invalid(errors));
        }
        let token = self.ctx.require_admin().await?;

        let result = match editing {
            Some(id) => self.source.update_category(&token, id, form).await,
            None => self.source.create_category(&token, form).await,
        };

        match result {
            Ok(category) => {
                let mut state = self.state.write().await;
                state.form_errors = FieldErrors::new();
                match state.categories.iter_mut().find(|c| c.id == category.id) {
                    Some(row) => *row = category.clone(),
                    None => state.categories.push(category.clone()),
                }
                sort_categories(&mut state.categories);
                drop(state);

                tracing::info!(category_id = category.id, created = editing.is_none(), "Category saved");
                let message = if editing.is_some() {
                    "Catégorie mise à jour"
                } else {
                    "Catégorie créée"
                };
                self.ctx.toasts.success(message).await;
                Ok(category)
            }
            Err(e) => {
                if let Some(errors) = e.field_errors() {
                    let mut state = self.state.write().await;
                    state.form_errors = FieldErrors::new();
                    state.form_errors.merge(errors.clone());
                }
                Err(self.ctx.report(AppError::Api(e)).await)
            }
        }
    }

    pub async fn delete(&self, id: DbId) -> Result<(), AppError> {
        self.ctx.confirm("Supprimer cette catégorie ?")?;
        let token = self.ctx.require_admin().await?;

        match self.source.delete_category(&token, id).await {
            Ok(()) => {
                self.state.write().await.categories.retain(|c| c.id != id);
                tracing::info!(category_id = id, "Category deleted");
                self.ctx.toasts.success("Catégorie supprimée").await;
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }

    /// Flip `is_active` on a listed category.
    pub async fn toggle_active(&self, id: DbId) -> Result<(), AppError> {
        if !self.state.read().await.categories.iter().any(|c| c.id == id) {
            return Err(AppError::Core(CoreError::NotLoaded { entity: "category", id }));
        }
        let token = self.ctx.require_admin().await?;

        match self.source.toggle_category_active(&token, id).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                if let Some(row) = state.categories.iter_mut().find(|c| c.id == id) {
                    match updated {
                        Some(category) => *row = category,
                        None => row.is_active = !row.is_active,
                    }
                }
                Ok(())
            }
            Err(e) => Err(self.ctx.report(AppError::Api(e)).await),
        }
    }
}
