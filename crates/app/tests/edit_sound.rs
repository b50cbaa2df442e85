mod common;

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use serde_json::{json, Value};

use sonique_app::edit_sound::{EditSound, SoundEditSource};
use sonique_app::toast::ToastKind;
use sonique_app::AppError;
use sonique_client::ApiError;
use sonique_core::envelope::FieldErrors;
use sonique_core::forms::SoundForm;
use sonique_core::models::{Category, Sound};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use common::{user_ctx, Calls};

#[derive(Default)]
struct EditBackend {
    calls: Calls,
    sent: Mutex<Vec<Value>>,
    reject_with: Option<FieldErrors>,
}

impl SoundEditSource for EditBackend {
    async fn get_sound(&self, _token: &BearerToken, id: DbId) -> Result<Sound, ApiError> {
        self.calls.record(format!("get:{id}"));
        Ok(serde_json::from_value(json!({
            "id": id,
            "title": "Bikutsi Night",
            "description": "Enregistré en live à Yaoundé",
            "price": "2500",
            "is_free": false,
            "category": {"id": 4, "name": "Bikutsi"},
            "tags": ["live", "yaoundé"],
        }))
        .unwrap())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.calls.record("categories");
        Ok(vec![serde_json::from_value(json!({"id": 4, "name": "Bikutsi"})).unwrap()])
    }

    async fn update_sound(&self, token: &BearerToken, id: DbId, form: &SoundForm) -> Result<Sound, ApiError> {
        self.calls.record(format!("update:{id}"));
        self.sent.lock().unwrap().push(form.to_payload());
        if let Some(errors) = &self.reject_with {
            return Err(ApiError::Http {
                status: 422,
                message: "The given data was invalid.".into(),
                errors: errors.clone(),
            });
        }
        let mut saved = self.get_sound(token, id).await?;
        saved.title = form.title.trim().to_string();
        Ok(saved)
    }
}

#[tokio::test]
async fn load_prefills_form_and_options() {
    let backend = Arc::new(EditBackend::default());
    let edit = EditSound::new(user_ctx(), Arc::clone(&backend), 12);
    edit.load().await.unwrap();

    let form = edit.form().await;
    assert_eq!(form.title, "Bikutsi Night");
    assert_eq!(form.category_id, Some(4));
    assert!(!form.is_free);
    assert_eq!(edit.categories().await.len(), 1);
}

#[tokio::test]
async fn paid_sound_without_price_is_blocked() {
    let backend = Arc::new(EditBackend::default());
    let edit = EditSound::new(user_ctx(), Arc::clone(&backend), 12);
    edit.load().await.unwrap();

    edit.edit(|form| {
        form.is_free = false;
        form.price = String::new();
    })
    .await;

    let err = edit.submit().await.unwrap_err();
    assert_matches!(&err, AppError::Invalid(errors) if errors.contains("price"));
    assert!(edit.errors().await.contains("price"));
    assert_eq!(backend.calls.count("update"), 0);
    assert!(!edit.is_saving().await);
}

#[tokio::test]
async fn free_sound_saves_with_null_price() {
    let ctx = user_ctx();
    let backend = Arc::new(EditBackend::default());
    let edit = EditSound::new(ctx.clone(), Arc::clone(&backend), 12);
    edit.load().await.unwrap();

    edit.edit(|form| {
        form.is_free = true;
        form.price = String::new();
        form.title = "  Bikutsi Night (live) ".into();
    })
    .await;
    let saved = edit.submit().await.unwrap();

    assert_eq!(saved.title, "Bikutsi Night (live)");
    let sent = backend.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["price"], Value::Null);
    assert_eq!(sent[0]["is_free"], json!(true));
    assert!(edit.errors().await.is_empty());
    assert_eq!(ctx.toasts.count(ToastKind::Success).await, 1);
}

#[tokio::test]
async fn server_field_errors_land_on_the_form() {
    let mut errors = FieldErrors::new();
    errors.add("title", "Ce titre existe déjà");
    let backend = Arc::new(EditBackend {
        reject_with: Some(errors),
        ..EditBackend::default()
    });
    let edit = EditSound::new(user_ctx(), Arc::clone(&backend), 12);
    edit.load().await.unwrap();

    assert_matches!(edit.submit().await, Err(AppError::Api(_)));
    assert_eq!(edit.errors().await.first("title"), Some("Ce titre existe déjà"));
    assert_eq!(backend.calls.count("update"), 1);
}

#[tokio::test]
async fn price_edit_keeps_stored_description() {
    let backend = Arc::new(EditBackend::default());
    let edit = EditSound::new(user_ctx(), Arc::clone(&backend), 12);
    edit.load().await.unwrap();
    assert_eq!(edit.form().await.description.as_deref(), Some("Enregistré en live à Yaoundé"));

    edit.edit(|form| form.price = "3000".into()).await;
    edit.submit().await.unwrap();

    let sent = backend.sent.lock().unwrap().clone();
    assert_eq!(sent[0]["description"], json!("Enregistré en live à Yaoundé"));
    assert_eq!(sent[0]["price"], json!(3000.0));
}
