//! Edit-sound form.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use sonique_client::ApiError;
use sonique_core::envelope::FieldErrors;
use sonique_core::forms::SoundForm;
use sonique_core::models::{Category, Sound};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::context::AppContext;
use crate::error::AppError;

pub trait SoundEditSource: Send + Sync + 'static {
    fn get_sound(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> impl Future<Output = Result<Sound, ApiError>> + Send;

    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    fn update_sound(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &SoundForm,
    ) -> impl Future<Output = Result<Sound, ApiError>> + Send;
}

/// Prefill the form from the stored sound.
pub fn form_from_sound(sound: &Sound) -> SoundForm {
    SoundForm {
        title: sound.title.clone(),
        description: sound.description.clone(),
        category_id: sound.category.as_ref().map(|c| c.id),
        tags: sound.tags.clone(),
        is_free: sound.is_free,
        price: sound.price.map(|p| format!("{p}")).unwrap_or_default(),
    }
}

#[derive(Debug, Default)]
struct EditState {
    form: SoundForm,
    errors: FieldErrors,
    categories: Vec<Category>,
    saving: bool,
}

pub struct EditSound<S> {
    ctx: AppContext,
    source: Arc<S>,
    sound_id: DbId,
    state: RwLock<EditState>,
}

impl<S: SoundEditSource> EditSound<S> {
    pub fn new(ctx: AppContext, source: Arc<S>, sound_id: DbId) -> Self {
        Self {
            ctx,
            source,
            sound_id,
            state: RwLock::new(EditState::default()),
        }
    }

    pub async fn form(&self) -> SoundForm {
        self.state.read().await.form.clone()
    }

    pub async fn errors(&self) -> FieldErrors {
        self.state.read().await.errors.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    pub async fn is_saving(&self) -> bool {
        self.state.read().await.saving
    }

    /// Fetch the sound and the category options, then prefill the form.
    pub async fn load(&self) -> Result<(), AppError> {
        let token = self.ctx.require_token().await?;
        let (sound, categories) = futures::join!(
            self.source.get_sound(&token, self.sound_id),
            self.source.list_categories(),
        );

        let sound = match sound {
            Ok(sound) => sound,
            Err(e) => return Err(self.ctx.report(AppError::Api(e)).await),
        };
        let mut state = self.state.write().await;
        state.form = form_from_sound(&sound);
        state.errors = FieldErrors::new();
        match categories {
            Ok(categories) => state.categories = categories,
            Err(e) => {
                drop(state);
                tracing::warn!(error = %e, "Category options unavailable");
                self.ctx.report(AppError::Api(e)).await;
            }
        }
        Ok(())
    }

    /// Edit the form in place. Errors are recomputed on the next submit.
    pub async fn edit(&self, f: impl FnOnce(&mut SoundForm)) {
        f(&mut self.state.write().await.form);
    }

    /// Validate and save. Invalid forms are never sent.
    pub async fn submit(&self) -> Result<Sound, AppError> {
        let form = {
            let mut state = self.state.write().await;
            if state.saving {
                return Err(AppError::Busy("save already in progress".to_string()));
            }
            if let Err(errors) = state.form.check() {
                state.errors = errors.clone();
                tracing::debug!(sound_id = self.sound_id, fields = errors.len(), "Edit form blocked");
                return Err(AppError::Invalid(errors));
            }
            state.errors = FieldErrors::new();
            state.saving = true;
            state.form.clone()
        };

        let result = match self.ctx.require_token().await {
            Ok(token) => self
                .source
                .update_sound(&token, self.sound_id, &form)
                .await
                .map_err(AppError::Api),
            Err(err) => Err(err),
        };

        let mut state = self.state.write().await;
        state.saving = false;
        match result {
            Ok(sound) => {
                state.form = form_from_sound(&sound);
                state.form.description = form.description;
                drop(state);
                self.ctx.toasts.success("Son mis à jour").await;
                Ok(sound)
            }
            Err(AppError::LoginRequired) => Err(AppError::LoginRequired),
            Err(err) => {
                if let Some(errors) = err.field_errors() {
                    state.errors.merge(errors.clone());
                }
                drop(state);
                Err(self.ctx.report(err).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefill_keeps_price_text() {
        let sound: Sound = serde_json::from_value(serde_json::json!({
            "id": 9,
            "title": "Bikutsi Night",
            "price": "2500",
            "category": {"id": 5, "name": "Bikutsi"},
            "tags": ["live"]
        }))
        .unwrap();
        let form = form_from_sound(&sound);
        assert_eq!(form.price, "2500");
        assert_eq!(form.category_id, Some(5));
        assert!(!form.is_free);
        assert!(form.check().is_ok());
    }
}
