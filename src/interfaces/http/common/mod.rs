//! Shared HTTP response types

pub mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Uniform response envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the request succeeded
    pub success: bool,
    /// Payload; `null` on error
    pub data: Option<T>,
    /// Error description; `null` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// HTTP status for a domain error.
///
/// Validation is client-correctable (422); state conflicts need a refresh
/// (409) and carry the canonical current state in the message; authorization
/// failures are 403, never silently ignored.
pub fn error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InvalidTransition { .. }
        | DomainError::AlreadyResolved(_)
        | DomainError::CheckoutExists(_)
        | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error into the handler rejection shape
pub fn domain_error<T>(err: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    (error_status(&err), Json(ApiResponse::error(err.to_string())))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            error_status(&DomainError::Validation("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&DomainError::AlreadyResolved("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&DomainError::InvalidTransition {
                entity: "rent request",
                from: "paid".into(),
                action: "confirm",
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&DomainError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_status(&DomainError::NotFound {
                entity: "Checkout",
                field: "id",
                value: "1".into(),
            }),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_message_carries_canonical_state() {
        let err = DomainError::InvalidTransition {
            entity: "rent request",
            from: "completed".into(),
            action: "pay",
        };
        assert!(err.to_string().contains("completed"));
    }
}
