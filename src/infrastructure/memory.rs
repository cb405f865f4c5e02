//! In-memory repository provider for development and testing
//!
//! DashMap-backed implementation of every repository trait. Per-entry
//! shard locks give the same serialization guarantees the database
//! implementations get from conditional updates: two racing resolutions of
//! one checkout cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::checkout::{
    AgentDecision, AgentDecisionRepository, Checkout, CheckoutRepository, CheckoutStatus,
    OwnerConfirmation, SettlementWrite,
};
use crate::domain::payment::{PaymentRecord, PaymentRepository};
use crate::domain::property::{Property, PropertyRepository};
use crate::domain::rent_request::{RentRequest, RentRequestRepository, RentRequestStatus};
use crate::domain::user::{User, UserRepository};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::pagination::PaginatedResult;

/// In-memory store implementing all repositories
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    users: DashMap<Uuid, User>,
    properties: DashMap<Uuid, Property>,
    rent_requests: DashMap<Uuid, RentRequest>,
    /// Keyed by `(rent_request_id, idempotency_key)`
    payments: DashMap<(Uuid, String), PaymentRecord>,
    checkouts: DashMap<Uuid, Checkout>,
    /// At-most-one-checkout-per-rental index
    checkout_by_request: DashMap<Uuid, Uuid>,
    /// Keyed by checkout ID
    decisions: DashMap<Uuid, AgentDecision>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn properties(&self) -> &dyn PropertyRepository {
        self
    }

    fn rent_requests(&self) -> &dyn RentRequestRepository {
        self
    }

    fn payments(&self) -> &dyn PaymentRepository {
        self
    }

    fn checkouts(&self) -> &dyn CheckoutRepository {
        self
    }

    fn decisions(&self) -> &dyn AgentDecisionRepository {
        self
    }
}

// ── UserRepository ──────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryRepositoryProvider {
    async fn save(&self, user: User) -> DomainResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

// ── PropertyRepository ──────────────────────────────────────────

#[async_trait]
impl PropertyRepository for InMemoryRepositoryProvider {
    async fn save(&self, property: Property) -> DomainResult<()> {
        self.properties.insert(property.id, property);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Property>> {
        Ok(self.properties.get(&id).map(|p| p.clone()))
    }
}

// ── RentRequestRepository ───────────────────────────────────────

#[async_trait]
impl RentRequestRepository for InMemoryRepositoryProvider {
    async fn save(&self, request: RentRequest) -> DomainResult<()> {
        self.rent_requests.insert(request.id, request);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<RentRequest>> {
        Ok(self.rent_requests.get(&id).map(|r| r.clone()))
    }

    async fn list_for_renter(
        &self,
        renter_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>> {
        Ok(paginate(
            self.rent_requests
                .iter()
                .filter(|r| r.renter_id == renter_id)
                .map(|r| r.clone())
                .collect(),
            page,
            limit,
        ))
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequest>> {
        Ok(paginate(
            self.rent_requests
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .map(|r| r.clone())
                .collect(),
            page,
            limit,
        ))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: RentRequestStatus,
        to: RentRequestStatus,
        action: &'static str,
    ) -> DomainResult<RentRequest> {
        // the entry guard serializes racing transitions on one row
        let mut entry = self.rent_requests.get_mut(&id).ok_or(DomainError::NotFound {
            entity: "RentRequest",
            field: "id",
            value: id.to_string(),
        })?;
        let request = entry.value_mut();
        if request.status != from {
            return Err(DomainError::InvalidTransition {
                entity: "rent request",
                from: request.status.as_str().to_string(),
                action,
            });
        }
        request.status = to;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

fn paginate(mut items: Vec<RentRequest>, page: u64, limit: u64) -> PaginatedResult<RentRequest> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = items.len() as u64;
    let start = (page.saturating_sub(1) * limit) as usize;
    let page_items: Vec<RentRequest> = items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();
    PaginatedResult::new(page_items, total, page, limit)
}

// ── PaymentRepository ───────────────────────────────────────────

#[async_trait]
impl PaymentRepository for InMemoryRepositoryProvider {
    async fn save(&self, payment: PaymentRecord) -> DomainResult<()> {
        let key = (payment.rent_request_id, payment.idempotency_key.clone());
        match self.payments.entry(key) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "payment with idempotency key '{}' already exists for rent request {}",
                payment.idempotency_key, payment.rent_request_id
            ))),
            Entry::Vacant(vacant) => {
                vacant.insert(payment);
                Ok(())
            }
        }
    }

    async fn find_by_key(
        &self,
        rent_request_id: Uuid,
        idempotency_key: &str,
    ) -> DomainResult<Option<PaymentRecord>> {
        Ok(self
            .payments
            .get(&(rent_request_id, idempotency_key.to_string()))
            .map(|p| p.clone()))
    }

    async fn find_by_rent_request(
        &self,
        rent_request_id: Uuid,
    ) -> DomainResult<Vec<PaymentRecord>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.rent_request_id == rent_request_id)
            .map(|p| p.clone())
            .collect())
    }
}

// ── CheckoutRepository ──────────────────────────────────────────

#[async_trait]
impl CheckoutRepository for InMemoryRepositoryProvider {
    async fn save(&self, checkout: Checkout) -> DomainResult<()> {
        // the index entry guard enforces at-most-one-checkout-per-rental
        match self.checkout_by_request.entry(checkout.rent_request_id) {
            Entry::Occupied(_) => {
                Err(DomainError::CheckoutExists(checkout.rent_request_id))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(checkout.id);
                self.checkouts.insert(checkout.id, checkout);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Checkout>> {
        Ok(self.checkouts.get(&id).map(|c| c.clone()))
    }

    async fn find_by_rent_request(
        &self,
        rent_request_id: Uuid,
    ) -> DomainResult<Option<Checkout>> {
        let Some(id) = self.checkout_by_request.get(&rent_request_id).map(|e| *e) else {
            return Ok(None);
        };
        Ok(self.checkouts.get(&id).map(|c| c.clone()))
    }

    async fn find_overdue(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Checkout>> {
        Ok(self
            .checkouts
            .iter()
            .filter(|c| c.awaiting_owner() && c.requested_at <= cutoff)
            .map(|c| c.clone())
            .collect())
    }

    async fn find_awaiting_decision(&self) -> DomainResult<Vec<Checkout>> {
        let mut items: Vec<Checkout> = self
            .checkouts
            .iter()
            .filter(|c| c.awaiting_decision())
            .map(|c| c.clone())
            .collect();
        items.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(items)
    }

    async fn resolve_owner_confirmation(
        &self,
        id: Uuid,
        to: OwnerConfirmation,
        owner_notes: Option<String>,
    ) -> DomainResult<Checkout> {
        let mut entry = self.checkouts.get_mut(&id).ok_or(DomainError::NotFound {
            entity: "Checkout",
            field: "id",
            value: id.to_string(),
        })?;
        let checkout = entry.value_mut();
        if checkout.owner_confirmation != OwnerConfirmation::Pending || checkout.is_settled() {
            return Err(DomainError::AlreadyResolved(format!(
                "checkout {} owner confirmation is '{}'",
                id, checkout.owner_confirmation
            )));
        }
        checkout.owner_confirmation = to;
        if let Some(notes) = owner_notes {
            checkout.owner_notes = Some(notes);
        }
        match to {
            OwnerConfirmation::Confirmed => checkout.status = CheckoutStatus::Confirmed,
            OwnerConfirmation::AutoConfirmed => checkout.status = CheckoutStatus::AutoConfirmed,
            _ => {}
        }
        Ok(checkout.clone())
    }

    async fn settle(&self, write: SettlementWrite) -> DomainResult<Checkout> {
        let settled = {
            let mut entry =
                self.checkouts
                    .get_mut(&write.checkout_id)
                    .ok_or(DomainError::NotFound {
                        entity: "Checkout",
                        field: "id",
                        value: write.checkout_id.to_string(),
                    })?;
            let checkout = entry.value_mut();
            if checkout.is_settled()
                || checkout.owner_confirmation != write.expected_confirmation
            {
                return Err(DomainError::AlreadyResolved(format!(
                    "checkout {} is '{}' with owner confirmation '{}'",
                    checkout.id, checkout.status, checkout.owner_confirmation
                )));
            }
            checkout.owner_confirmation = write.confirmation;
            if let Some(notes) = write.owner_notes.clone() {
                checkout.owner_notes = Some(notes);
            }
            checkout.apply_settlement(
                &write.breakdown,
                write.refund_purchase_id,
                write.payout_purchase_id,
                write.resolved_at,
            )?;
            checkout.clone()
        };

        if let Some(decision) = write.decision {
            self.decisions.insert(decision.checkout_id, decision);
        }

        // the settled checkout also completes its rental
        if let Some(mut request) = self.rent_requests.get_mut(&settled.rent_request_id) {
            if request.status == RentRequestStatus::Paid {
                request.status = RentRequestStatus::Completed;
                request.updated_at = Utc::now();
            }
        }

        Ok(settled)
    }
}

// ── AgentDecisionRepository ─────────────────────────────────────

#[async_trait]
impl AgentDecisionRepository for InMemoryRepositoryProvider {
    async fn find_by_checkout(&self, checkout_id: Uuid) -> DomainResult<Option<AgentDecision>> {
        Ok(self.decisions.get(&checkout_id).map(|d| d.clone()))
    }
}

// ── Tests ──────────────────────────────────────────────────────
