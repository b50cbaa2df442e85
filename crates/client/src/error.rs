//! Error taxonomy of the REST layer.
//!
//! Mirrors the four failure kinds views distinguish: transport failures,
//! HTTP status failures, `success: false` bodies, and validation errors
//! (carried inside the latter two as a field map).

use sonique_core::envelope::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, broken stream).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    /// A 2xx response whose envelope says `success: false`.
    #[error("{message}")]
    Application { message: String, errors: FieldErrors },

    /// The body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build an application failure without field errors.
    pub fn application(message: impl Into<String>) -> Self {
        ApiError::Application {
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    /// HTTP status, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field-level validation errors reported by the backend, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Http { errors, .. } | ApiError::Application { errors, .. }
                if !errors.is_empty() =>
            {
                Some(errors)
            }
            _ => None,
        }
    }

    /// The session token was missing, expired or revoked.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text suitable for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Request(_) => "Erreur réseau, veuillez réessayer".to_string(),
            ApiError::Http { status: 401, .. } => "Session expirée, veuillez vous reconnecter".to_string(),
            ApiError::Http { status: 403, .. } => "Accès refusé".to_string(),
            ApiError::Http { message, .. } | ApiError::Application { message, .. } => {
                message.clone()
            }
            ApiError::Decode(_) => "Réponse inattendue du serveur".to_string(),
            ApiError::InvalidUrl(msg) => msg.clone(),
        }
    }
}
