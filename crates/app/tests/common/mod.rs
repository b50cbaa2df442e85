#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::json;

use sonique_app::confirm::{AutoConfirm, Confirmer};
use sonique_app::session::SessionProvider;
use sonique_app::{AppConfig, AppContext};
use sonique_core::envelope::{Page, Pagination};
use sonique_core::models::{Clip, Sound};
use sonique_core::session::{BearerToken, UserProfile, ROLE_ADMIN, ROLE_USER};
use sonique_core::types::DbId;

pub fn sound(id: DbId) -> Sound {
    sound_with_status(id, "published")
}

pub fn sound_with_status(id: DbId, status: &str) -> Sound {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("Son {id}"),
        "status": status,
        "price": "1500",
        "likes_count": id,
    }))
    .unwrap()
}

pub fn clip(id: DbId, status: &str) -> Clip {
    serde_json::from_value(json!({"id": id, "title": format!("Clip {id}"), "status": status})).unwrap()
}

pub fn page<T>(items: Vec<T>, current_page: u32, last_page: u32) -> Page<T> {
    let total = items.len() as u64;
    Page::new(
        items,
        Pagination {
            current_page,
            last_page,
            per_page: 20,
            total,
            has_more: None,
        },
    )
}

fn profile(role: &str) -> UserProfile {
    UserProfile {
        id: 1,
        name: "Test".into(),
        email: None,
        role: Some(role.into()),
    }
}

pub fn ctx_with(session: SessionProvider, confirmer: Arc<dyn Confirmer>) -> AppContext {
    AppContext::new(AppConfig::default())
        .with_session(session)
        .with_confirmer(confirmer)
}

pub fn admin_ctx() -> AppContext {
    admin_ctx_confirming(Arc::new(AutoConfirm(true)))
}

/// Admin session with a caller-chosen confirmation answer.
pub fn admin_ctx_confirming(confirmer: Arc<dyn Confirmer>) -> AppContext {
    ctx_with(
        SessionProvider::with_token(BearerToken::new("admin-token"), Some(profile(ROLE_ADMIN))),
        confirmer,
    )
}

pub fn user_ctx() -> AppContext {
    ctx_with(
        SessionProvider::with_token(BearerToken::new("user-token"), Some(profile(ROLE_USER))),
        Arc::new(AutoConfirm(true)),
    )
}

pub fn anon_ctx() -> AppContext {
    ctx_with(SessionProvider::anonymous(), Arc::new(AutoConfirm(true)))
}

/// Call log shared by the fakes.
#[derive(Debug, Default)]
pub struct Calls(Mutex<Vec<String>>);

impl Calls {
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}
