use crate::types::DbId;

/// Domain rule violations detected before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The action does not apply to the entity in its current state
    /// (full event, non-refundable transaction, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{entity} {id} is not loaded")]
    NotLoaded { entity: &'static str, id: DbId },
}

impl CoreError {
    /// The bare message, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            CoreError::Validation(msg) | CoreError::Conflict(msg) => msg.clone(),
            CoreError::NotLoaded { .. } => self.to_string(),
        }
    }
}
