//! Checkout and agent-decision repository interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{AgentDecision, Checkout, OwnerConfirmation, SettlementWrite};
use crate::domain::DomainResult;

#[async_trait]
pub trait CheckoutRepository: Send + Sync {
    /// Save a new checkout.
    ///
    /// Fails with `CheckoutExists` when the rental already has one
    /// (at-most-one-checkout-per-rental invariant, backed by a unique
    /// constraint on `rent_request_id`).
    async fn save(&self, checkout: Checkout) -> DomainResult<()>;

    /// Find checkout by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Checkout>>;

    /// Find the checkout for a rental, if any
    async fn find_by_rent_request(&self, rent_request_id: Uuid) -> DomainResult<Option<Checkout>>;

    /// Checkouts still awaiting the owner whose `requested_at` is at or
    /// before `cutoff` (sweep input)
    async fn find_overdue(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Checkout>>;

    /// Checkouts eligible for an agent decision (agent queue)
    async fn find_awaiting_decision(&self) -> DomainResult<Vec<Checkout>>;

    /// Atomically move `owner_confirmation` out of `pending`.
    ///
    /// The state check and the write are one operation; the second of two
    /// racing resolutions fails with `AlreadyResolved` and never overwrites
    /// the first. Returns the updated checkout.
    async fn resolve_owner_confirmation(
        &self,
        id: Uuid,
        to: OwnerConfirmation,
        owner_notes: Option<String>,
    ) -> DomainResult<Checkout>;

    /// Apply a settlement resolution in a single transaction.
    ///
    /// Conditional on `write.expected_confirmation` and on the checkout not
    /// being settled yet; persists the settlement fields, the final
    /// confirmation, the agent decision (when present) and completes the
    /// associated rent request. Partial writes are impossible: a failure
    /// anywhere rolls the whole resolution back.
    async fn settle(&self, write: SettlementWrite) -> DomainResult<Checkout>;
}

#[async_trait]
pub trait AgentDecisionRepository: Send + Sync {
    /// Find the decision recorded for a checkout, if any
    async fn find_by_checkout(&self, checkout_id: Uuid) -> DomainResult<Option<AgentDecision>>;
}
