//! Composition root for the shared providers.

use std::sync::Arc;

use sonique_core::session::BearerToken;

use crate::cart::Cart;
use crate::config::AppConfig;
use crate::confirm::{AutoConfirm, Confirmer};
use crate::error::AppError;
use crate::session::SessionProvider;
use crate::toast::ToastCenter;

/// Providers every view receives. Cloning shares the same providers.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub session: Arc<SessionProvider>,
    pub cart: Arc<Cart>,
    pub toasts: Arc<ToastCenter>,
    pub confirmer: Arc<dyn Confirmer>,
}

impl AppContext {
    /// Build the providers from configuration. A configured token starts
    /// an authenticated session; destructive actions are refused until a
    /// real confirmer is installed.
    pub fn new(config: AppConfig) -> Self {
        let session = match &config.api_token {
            Some(token) => SessionProvider::with_token(BearerToken::new(token.clone()), None),
            None => SessionProvider::anonymous(),
        };
        let toasts = ToastCenter::new(config.toast_history);
        Self {
            config: Arc::new(config),
            session: Arc::new(session),
            cart: Arc::new(Cart::new()),
            toasts: Arc::new(toasts),
            confirmer: Arc::new(AutoConfirm(false)),
        }
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn with_session(mut self, session: SessionProvider) -> Self {
        self.session = Arc::new(session);
        self
    }

    /// Token for a gated call. Shows the login toast when anonymous.
    pub async fn require_token(&self) -> Result<BearerToken, AppError> {
        self.gate(self.session.require_token().await).await
    }

    /// Token for an admin call. Shows a toast on failure.
    pub async fn require_admin(&self) -> Result<BearerToken, AppError> {
        self.gate(self.session.require_admin().await).await
    }

    /// Ask for confirmation; [`AppError::Cancelled`] when declined.
    pub fn confirm(&self, prompt: &str) -> Result<(), AppError> {
        if self.confirmer.confirm(prompt) {
            Ok(())
        } else {
            tracing::debug!(prompt, "Confirmation declined");
            Err(AppError::Cancelled)
        }
    }

    /// Toast an error the way every view does and hand it back.
    pub async fn report(&self, err: AppError) -> AppError {
        match &err {
            AppError::LoginRequired => {
                self.toasts.login_required().await;
            }
            AppError::Cancelled | AppError::Invalid(_) => {}
            other => {
                self.toasts.error(other.user_message()).await;
            }
        }
        err
    }

    async fn gate(&self, result: Result<BearerToken, AppError>) -> Result<BearerToken, AppError> {
        match result {
            Ok(token) => Ok(token),
            Err(err) => Err(self.report(err).await),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
