//! Rent request repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{RentRequest, RentRequestStatus};
use crate::domain::DomainResult;
use crate::shared::pagination::PaginatedResult;

#[async_trait]
pub trait RentRequestRepository: Send + Sync {
    /// Save a new rent request
    async fn save(&self, request: RentRequest) -> DomainResult<()>;

    /// Find rent request by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RentRequest>>;

    /// Paginated list of requests made by a renter, newest first
    async fn list_for_renter(
        &self,
        renter_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>>;

    /// Paginated list of requests received by a property owner, newest first
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>>;

    /// Atomically move a request from `from` to `to`.
    ///
    /// The status check and the write are one operation, so concurrent
    /// actors racing on the same row cannot both win. Fails with
    /// `InvalidTransition` carrying the canonical current status when the
    /// row is no longer in `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: RentRequestStatus,
        to: RentRequestStatus,
        action: &'static str,
    ) -> DomainResult<RentRequest>;
}
