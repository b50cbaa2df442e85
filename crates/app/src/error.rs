use sonique_client::ApiError;
use sonique_core::envelope::FieldErrors;
use sonique_core::error::CoreError;

/// Failure of a view action.
///
/// Views surface most of these as toasts before returning them; the
/// value is still returned so callers (and tests) can branch on it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication required")]
    LoginRequired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Client-side validation failed; nothing was sent.
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// The user declined a confirmation prompt.
    #[error("Action cancelled")]
    Cancelled,

    /// The same action is already running for this item.
    #[error("Busy: {0}")]
    Busy(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AppError {
    /// Per-field errors, from client-side checks or the backend's `errors` map.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Invalid(errors) => Some(errors),
            AppError::Api(err) => err.field_errors(),
            _ => None,
        }
    }

    /// Text suitable for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            AppError::LoginRequired => crate::toast::LOGIN_REQUIRED_MESSAGE.to_string(),
            AppError::Forbidden(_) => "Accès refusé".to_string(),
            AppError::Invalid(_) => "Veuillez corriger les champs en erreur".to_string(),
            AppError::Cancelled => "Action annulée".to_string(),
            AppError::Busy(what) => what.clone(),
            AppError::Api(err) => err.user_message(),
            AppError::Io(err) => format!("Erreur d'écriture du fichier : {err}"),
            AppError::Core(err) => err.message(),
        }
    }
}
