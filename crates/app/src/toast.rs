//! Toast notifications.
//!
//! [`ToastCenter`] fans toasts out to any number of UI subscribers over a
//! `tokio::sync::broadcast` channel and keeps a bounded history so tests
//! and the CLI can inspect what was shown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use sonique_core::types::Timestamp;

/// Text of the toast shown when a gated action is attempted anonymously.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Veuillez vous connecter pour continuer";

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Info,
    Success,
    Error,
    /// Error toast carrying a "log in" call to action.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: Timestamp,
}

pub struct ToastCenter {
    sender: broadcast::Sender<Toast>,
    history: RwLock<VecDeque<Toast>>,
    history_limit: usize,
    next_id: AtomicU64,
}

impl ToastCenter {
    pub fn new(history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: RwLock::new(VecDeque::new()),
            history_limit,
            next_id: AtomicU64::new(1),
        }
    }

    /// Show a toast. Dropped silently when nobody is subscribed; the
    /// history still records it.
    pub async fn push(&self, kind: ToastKind, message: impl Into<String>) -> Toast {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
            created_at: chrono::Utc::now(),
        };

        {
            let mut history = self.history.write().await;
            history.push_back(toast.clone());
            while history.len() > self.history_limit {
                history.pop_front();
            }
        }

        let _ = self.sender.send(toast.clone());
        toast
    }

    pub async fn info(&self, message: impl Into<String>) -> Toast {
        self.push(ToastKind::Info, message).await
    }

    pub async fn success(&self, message: impl Into<String>) -> Toast {
        self.push(ToastKind::Success, message).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Toast {
        let message = message.into();
        tracing::warn!(%message, "Error toast");
        self.push(ToastKind::Error, message).await
    }

    pub async fn login_required(&self) -> Toast {
        self.push(ToastKind::LoginRequired, LOGIN_REQUIRED_MESSAGE).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    /// Most recent toasts, oldest first.
    pub async fn history(&self) -> Vec<Toast> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn count(&self, kind: ToastKind) -> usize {
        self.history
            .read()
            .await
            .iter()
            .filter(|t| t.kind == kind)
            .count()
    }

    pub async fn last(&self) -> Option<Toast> {
        self.history.read().await.back().cloned()
    }

    pub async fn clear(&self) {
        self.history.write().await.clear();
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TOAST_HISTORY)
    }
}
