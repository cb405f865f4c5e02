//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// Acting on an aggregate whose state no longer permits the action.
    /// `from` carries the canonical current state so callers can refresh.
    #[error("{entity} cannot {action} while in state '{from}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    /// A second confirm/reject/auto-confirm after the checkout left its
    /// pending state. Never overwrites the first resolution.
    #[error("Already resolved: {0}")]
    AlreadyResolved(String),

    #[error("A checkout already exists for rent request {0}")]
    CheckoutExists(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
