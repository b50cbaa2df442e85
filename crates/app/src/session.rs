//! Auth/session provider.

use tokio::sync::RwLock;

use sonique_core::session::{BearerToken, UserProfile};

use crate::error::AppError;

#[derive(Debug, Clone)]
struct Session {
    token: BearerToken,
    user: Option<UserProfile>,
}

/// Holds the current bearer token and, when known, the signed-in user.
///
/// Shared via `Arc` through the [`AppContext`](crate::AppContext).
#[derive(Debug, Default)]
pub struct SessionProvider {
    current: RwLock<Option<Session>>,
}

impl SessionProvider {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: BearerToken, user: Option<UserProfile>) -> Self {
        Self {
            current: RwLock::new(Some(Session { token, user })),
        }
    }

    pub async fn sign_in(&self, token: BearerToken, user: Option<UserProfile>) {
        if let Some(user) = &user {
            tracing::info!(user_id = user.id, "Signed in");
        }
        *self.current.write().await = Some(Session { token, user });
    }

    pub async fn sign_out(&self) {
        *self.current.write().await = None;
        tracing::info!("Signed out");
    }

    pub async fn token(&self) -> Option<BearerToken> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.current.read().await.as_ref().and_then(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Token for a gated call, or [`AppError::LoginRequired`].
    pub async fn require_token(&self) -> Result<BearerToken, AppError> {
        self.token().await.ok_or(AppError::LoginRequired)
    }

    /// Token for an admin call.
    ///
    /// When the profile is unknown (token supplied out of band) the call
    /// is allowed and the backend enforces the role.
    pub async fn require_admin(&self) -> Result<BearerToken, AppError> {
        let guard = self.current.read().await;
        let session = guard.as_ref().ok_or(AppError::LoginRequired)?;
        match &session.user {
            Some(user) if !user.is_admin() => Err(AppError::Forbidden(format!(
                "user {} is not an administrator",
                user.id
            ))),
            _ => Ok(session.token.clone()),
        }
    }
}
