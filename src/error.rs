use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::game::GameError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The game or list is locked against changes.
    #[error("locked: {0}")]
    Locked(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request contradicts the stored record (wrong key, wrong confirmation code).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Locked(code) => ServiceError::Locked(code),
            GameError::EventNotFound { .. } => ServiceError::NotFound(err.to_string()),
            GameError::InvalidPeriod(_) | GameError::EmptyLockKey => {
                ServiceError::InvalidInput(err.to_string())
            }
            GameError::UnlockKeyMismatch => ServiceError::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(GameError::Locked("CODE2".into())),
            ServiceError::Locked(code) if code == "CODE2"
        ));
        assert!(matches!(
            ServiceError::from(GameError::EventNotFound {
                game: "CODE1".into(),
                event: "01:30 Home Goal".into(),
            }),
            ServiceError::NotFound(message) if message.contains("01:30 Home Goal")
        ));
        assert!(matches!(
            ServiceError::from(GameError::InvalidPeriod(0)),
            ServiceError::InvalidInput(_)
        ));
        assert!(matches!(
            ServiceError::from(GameError::UnlockKeyMismatch),
            ServiceError::Conflict(_)
        ));
    }
}
