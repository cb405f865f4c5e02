//! Payment repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::PaymentRecord;
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment record.
    ///
    /// Fails with `Conflict` when a record with the same
    /// `(rent_request_id, idempotency_key)` already exists.
    async fn save(&self, payment: PaymentRecord) -> DomainResult<()>;

    /// Find a payment by its idempotency key
    async fn find_by_key(
        &self,
        rent_request_id: Uuid,
        idempotency_key: &str,
    ) -> DomainResult<Option<PaymentRecord>>;

    /// All payments recorded for a rental
    async fn find_by_rent_request(
        &self,
        rent_request_id: Uuid,
    ) -> DomainResult<Vec<PaymentRecord>>;
}
