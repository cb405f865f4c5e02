//! SeaORM repository implementations

mod checkout_repository;
mod decision_repository;
mod payment_repository;
mod property_repository;
mod rent_request_repository;
mod repository_provider;
mod user_repository;

pub use checkout_repository::SeaOrmCheckoutRepository;
pub use decision_repository::SeaOrmAgentDecisionRepository;
pub use payment_repository::SeaOrmPaymentRepository;
pub use property_repository::SeaOrmPropertyRepository;
pub use rent_request_repository::SeaOrmRentRequestRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;

use rust_decimal::Decimal;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

/// Monetary columns are stored as decimal strings; a malformed value is a
/// data defect and maps to zero rather than poisoning every read.
pub(crate) fn parse_amount(s: &str) -> Decimal {
    s.parse().unwrap_or_default()
}

pub(crate) fn parse_amount_opt(s: &Option<String>) -> Option<Decimal> {
    s.as_deref().map(parse_amount)
}
