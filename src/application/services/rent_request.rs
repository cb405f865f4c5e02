//! Rent request lifecycle service
//!
//! Orchestrates the top-level state machine from request to payment. Every
//! transition is actor-gated by the access guard, applied through a
//! conditional repository update, and published on the event bus.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::application::events::SharedEventBus;
use crate::domain::access;
use crate::domain::events::{Event, RentRequestEventData};
use crate::domain::payment::PaymentRecord;
use crate::domain::property::Property;
use crate::domain::rent_request::{RentRequest, RentRequestStatus};
use crate::domain::user::{User, UserRole};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::pagination::PaginatedResult;

/// A rent request with its embedded property and renter summaries
#[derive(Debug, Clone)]
pub struct RentRequestDetails {
    pub request: RentRequest,
    pub property: Option<Property>,
    pub renter: Option<User>,
}

/// Result of a (possibly replayed) pay call
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub record: PaymentRecord,
    /// Deterministic gateway redirect for this payment, when configured
    pub redirect_url: Option<String>,
}

/// Service for rent request operations
pub struct RentRequestService {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
    gateway_redirect_base: Option<String>,
}

impl RentRequestService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        gateway_redirect_base: Option<String>,
    ) -> Self {
        Self {
            repos,
            event_bus,
            gateway_redirect_base,
        }
    }

    /// Renter opens a new rent request against an active property
    pub async fn create(
        &self,
        renter_id: Uuid,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> DomainResult<RentRequest> {
        let property = self
            .repos
            .properties()
            .find_by_id(property_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Property",
                field: "id",
                value: property_id.to_string(),
            })?;

        if !property.is_active {
            return Err(DomainError::Validation(
                "property is not available for rent".to_string(),
            ));
        }
        if property.owner_id == renter_id {
            return Err(DomainError::Validation(
                "owners cannot rent their own property".to_string(),
            ));
        }

        let request = RentRequest::new(
            property_id,
            renter_id,
            property.owner_id,
            check_in,
            check_out,
            property.rent_amount,
            property.deposit_amount,
            property.currency.clone(),
        )?;
        self.repos.rent_requests().save(request.clone()).await?;

        info!(
            rent_request_id = %request.id,
            property_id = %property_id,
            "Rent request created"
        );
        metrics::counter!("rent_request_transitions_total", "action" => "create").increment(1);
        self.event_bus
            .publish(Event::RentRequestCreated(event_data(&request)));

        Ok(request)
    }

    /// Owner accepts a pending request
    pub async fn confirm(&self, id: Uuid, actor_id: Uuid, role: UserRole) -> DomainResult<RentRequest> {
        let request = self.load(id).await?;
        if !access::can_confirm_request(&request, actor_id, role) {
            self.deny_unless_owner(&request, actor_id, "confirm")?;
        }

        let updated = self
            .repos
            .rent_requests()
            .transition(id, RentRequestStatus::Pending, RentRequestStatus::Confirmed, "confirm")
            .await?;

        info!(rent_request_id = %id, "Rent request confirmed by owner");
        metrics::counter!("rent_request_transitions_total", "action" => "confirm").increment(1);
        self.event_bus
            .publish(Event::RentRequestConfirmed(event_data(&updated)));
        Ok(updated)
    }

    /// Owner declines a pending request
    pub async fn reject(&self, id: Uuid, actor_id: Uuid, role: UserRole) -> DomainResult<RentRequest> {
        let request = self.load(id).await?;
        if !access::can_reject_request(&request, actor_id, role) {
            self.deny_unless_owner(&request, actor_id, "reject")?;
        }

        let updated = self
            .repos
            .rent_requests()
            .transition(id, RentRequestStatus::Pending, RentRequestStatus::Rejected, "reject")
            .await?;

        info!(rent_request_id = %id, "Rent request rejected by owner");
        metrics::counter!("rent_request_transitions_total", "action" => "reject").increment(1);
        self.event_bus
            .publish(Event::RentRequestRejected(event_data(&updated)));
        Ok(updated)
    }

    /// Renter withdraws a confirmed request
    pub async fn cancel(&self, id: Uuid, actor_id: Uuid, role: UserRole) -> DomainResult<RentRequest> {
        let request = self.load(id).await?;
        if !access::can_cancel_request(&request, actor_id, role) {
            self.deny_unless_renter(&request, actor_id, "cancel")?;
        }

        let updated = self
            .repos
            .rent_requests()
            .transition(id, RentRequestStatus::Confirmed, RentRequestStatus::Cancelled, "cancel")
            .await?;

        info!(rent_request_id = %id, "Rent request cancelled by renter");
        metrics::counter!("rent_request_transitions_total", "action" => "cancel").increment(1);
        self.event_bus
            .publish(Event::RentRequestCancelled(event_data(&updated)));
        Ok(updated)
    }

    /// Owner withdraws a confirmed request
    pub async fn cancel_confirmed(
        &self,
        id: Uuid,
        actor_id: Uuid,
        role: UserRole,
    ) -> DomainResult<RentRequest> {
        let request = self.load(id).await?;
        if !access::can_cancel_confirmed(&request, actor_id, role) {
            self.deny_unless_owner(&request, actor_id, "cancel_confirmed")?;
        }

        let updated = self
            .repos
            .rent_requests()
            .transition(
                id,
                RentRequestStatus::Confirmed,
                RentRequestStatus::CancelledByOwner,
                "cancel_confirmed",
            )
            .await?;

        info!(rent_request_id = %id, "Rent request cancelled by owner");
        metrics::counter!("rent_request_transitions_total", "action" => "cancel_confirmed")
            .increment(1);
        self.event_bus
            .publish(Event::RentRequestCancelledByOwner(event_data(&updated)));
        Ok(updated)
    }

    /// Renter pays rent plus deposit into escrow.
    ///
    /// Idempotent: a repeated call with the same key returns the original
    /// payment untouched and performs no second charge or state change.
    pub async fn pay(
        &self,
        id: Uuid,
        actor_id: Uuid,
        role: UserRole,
        idempotency_key: &str,
    ) -> DomainResult<PaymentOutcome> {
        if crate::shared::validations::is_blank(idempotency_key) {
            return Err(DomainError::Validation(
                "idempotency_key must not be empty".to_string(),
            ));
        }

        let request = self.load(id).await?;
        if actor_id != request.renter_id {
            return Err(DomainError::Forbidden(
                "only the renter of record may pay this rent request".to_string(),
            ));
        }

        // Replay of an already-settled call wins over the state check
        if let Some(existing) = self.repos.payments().find_by_key(id, idempotency_key).await? {
            return Ok(self.outcome(existing));
        }

        if !access::can_pay(&request, actor_id, role) {
            self.deny_unless_renter(&request, actor_id, "pay")?;
        }

        let updated = match self
            .repos
            .rent_requests()
            .transition(id, RentRequestStatus::Confirmed, RentRequestStatus::Paid, "pay")
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                // Lost the race against a concurrent retry with the same key
                if let Some(existing) =
                    self.repos.payments().find_by_key(id, idempotency_key).await?
                {
                    return Ok(self.outcome(existing));
                }
                return Err(e);
            }
        };

        let record = PaymentRecord::new(
            id,
            idempotency_key,
            updated.total_due(),
            updated.currency.clone(),
        );
        match self.repos.payments().save(record.clone()).await {
            Ok(()) => {}
            Err(DomainError::Conflict(_)) => {
                // The concurrent retry persisted its record first; return it
                if let Some(existing) =
                    self.repos.payments().find_by_key(id, idempotency_key).await?
                {
                    return Ok(self.outcome(existing));
                }
            }
            Err(e) => return Err(e),
        }

        info!(
            rent_request_id = %id,
            amount = %record.amount,
            transaction_ref = %record.transaction_ref,
            "Rent request paid"
        );
        metrics::counter!("rent_request_transitions_total", "action" => "pay").increment(1);
        self.event_bus
            .publish(Event::RentRequestPaid(event_data(&updated)));

        Ok(self.outcome(record))
    }

    /// Fetch one request with embedded summaries. Parties and arbitrators only.
    pub async fn get(
        &self,
        id: Uuid,
        actor_id: Uuid,
        role: UserRole,
    ) -> DomainResult<RentRequestDetails> {
        let request = self.load(id).await?;
        if actor_id != request.renter_id && actor_id != request.owner_id && !role.can_arbitrate() {
            return Err(DomainError::Forbidden(
                "only the renter, the owner or an agent may view this rent request".to_string(),
            ));
        }
        self.with_details(request).await
    }

    /// Paginated list of the caller's requests, as renter or as owner
    pub async fn list(
        &self,
        actor_id: Uuid,
        as_owner: bool,
        page: u64,
        limit: u64,
    ) -> DomainResult<PaginatedResult<RentRequestDetails>> {
        let page_result = if as_owner {
            self.repos
                .rent_requests()
                .list_for_owner(actor_id, page, limit)
                .await?
        } else {
            self.repos
                .rent_requests()
                .list_for_renter(actor_id, page, limit)
                .await?
        };

        let mut items = Vec::with_capacity(page_result.items.len());
        for request in page_result.items {
            items.push(self.with_details(request).await?);
        }
        Ok(PaginatedResult {
            items,
            total: page_result.total,
            page: page_result.page,
            limit: page_result.limit,
            total_pages: page_result.total_pages,
        })
    }

    async fn with_details(&self, request: RentRequest) -> DomainResult<RentRequestDetails> {
        let property = self.repos.properties().find_by_id(request.property_id).await?;
        let renter = self.repos.users().find_by_id(request.renter_id).await?;
        Ok(RentRequestDetails {
            request,
            property,
            renter,
        })
    }

    async fn load(&self, id: Uuid) -> DomainResult<RentRequest> {
        self.repos
            .rent_requests()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "RentRequest",
                field: "id",
                value: id.to_string(),
            })
    }

    fn outcome(&self, record: PaymentRecord) -> PaymentOutcome {
        let redirect_url = self
            .gateway_redirect_base
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), record.transaction_ref));
        PaymentOutcome {
            record,
            redirect_url,
        }
    }

    fn deny_unless_owner(
        &self,
        request: &RentRequest,
        actor_id: Uuid,
        action: &'static str,
    ) -> DomainResult<()> {
        if actor_id != request.owner_id {
            return Err(DomainError::Forbidden(format!(
                "only the property owner of record may {} this rent request",
                action
            )));
        }
        Err(DomainError::InvalidTransition {
            entity: "rent request",
            from: request.status.as_str().to_string(),
            action,
        })
    }

    fn deny_unless_renter(
        &self,
        request: &RentRequest,
        actor_id: Uuid,
        action: &'static str,
    ) -> DomainResult<()> {
        if actor_id != request.renter_id {
            return Err(DomainError::Forbidden(format!(
                "only the renter of record may {} this rent request",
                action
            )));
        }
        Err(DomainError::InvalidTransition {
            entity: "rent request",
            from: request.status.as_str().to_string(),
            action,
        })
    }
}

fn event_data(request: &RentRequest) -> RentRequestEventData {
    RentRequestEventData {
        rent_request_id: request.id,
        property_id: request.property_id,
        renter_id: request.renter_id,
        owner_id: request.owner_id,
        status: request.status.as_str().to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::domain::user::User;
    use crate::infrastructure::memory::InMemoryRepositoryProvider;

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        service: RentRequestService,
        bus: SharedEventBus,
        renter: Uuid,
        owner: Uuid,
        property: Uuid,
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let bus = create_event_bus();

        let renter = User::new("Rita Renter", "rita@example.com", UserRole::Renter);
        let owner = User::new("Omar Owner", "omar@example.com", UserRole::Owner);
        let property = Property::new(
            owner.id,
            "Sunny flat",
            "12 Elm Street",
            "1200.00".parse().unwrap(),
            "600.00".parse().unwrap(),
            "USD",
        );

        let renter_id = renter.id;
        let owner_id = owner.id;
        let property_id = property.id;

        repos.users().save(renter).await.unwrap();
        repos.users().save(owner).await.unwrap();
        repos.properties().save(property).await.unwrap();

        let service = RentRequestService::new(
            repos.clone() as Arc<dyn RepositoryProvider>,
            bus.clone(),
            Some("https://pay.example.com/redirect".to_string()),
        );

        Fixture {
            repos,
            service,
            bus,
            renter: renter_id,
            owner: owner_id,
            property: property_id,
        }
    }

    async fn create_request(f: &Fixture) -> RentRequest {
        f.service
            .create(
                f.renter,
                f.property,
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_snapshots_property_terms() {
        let f = fixture().await;
        let request = create_request(&f).await;
        assert_eq!(request.status, RentRequestStatus::Pending);
        assert_eq!(request.owner_id, f.owner);
        assert_eq!(request.rent_amount, "1200.00".parse().unwrap());
        assert_eq!(request.deposit_amount, "600.00".parse().unwrap());
    }

    #[tokio::test]
    async fn create_rejects_own_property() {
        let f = fixture().await;
        let err = f
            .service
            .create(
                f.owner,
                f.property,
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn confirm_is_owner_only() {
        let f = fixture().await;
        let request = create_request(&f).await;

        let err = f
            .service
            .confirm(request.id, f.renter, UserRole::Renter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = f
            .service
            .confirm(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap();
        assert_eq!(updated.status, RentRequestStatus::Confirmed);
    }

    #[tokio::test]
    async fn double_confirm_conflicts_and_keeps_state() {
        let f = fixture().await;
        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();

        let err = f
            .service
            .confirm(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let stored = f.repos.rent_requests().find_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RentRequestStatus::Confirmed);
    }

    #[tokio::test]
    async fn reject_from_pending() {
        let f = fixture().await;
        let request = create_request(&f).await;
        let updated = f
            .service
            .reject(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap();
        assert_eq!(updated.status, RentRequestStatus::Rejected);
    }

    #[tokio::test]
    async fn cancel_paths_keep_audit_trail() {
        let f = fixture().await;

        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();
        let by_renter = f
            .service
            .cancel(request.id, f.renter, UserRole::Renter)
            .await
            .unwrap();
        assert_eq!(by_renter.status, RentRequestStatus::Cancelled);

        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();
        let by_owner = f
            .service
            .cancel_confirmed(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap();
        assert_eq!(by_owner.status, RentRequestStatus::CancelledByOwner);
    }

    #[tokio::test]
    async fn pay_moves_to_paid_and_charges_rent_plus_deposit() {
        let f = fixture().await;
        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();

        let outcome = f
            .service
            .pay(request.id, f.renter, UserRole::Renter, "key-1")
            .await
            .unwrap();
        assert_eq!(outcome.record.amount, "1800.00".parse().unwrap());
        assert_eq!(
            outcome.redirect_url.as_deref(),
            Some(
                format!(
                    "https://pay.example.com/redirect/{}",
                    outcome.record.transaction_ref
                )
                .as_str()
            )
        );

        let stored = f.repos.rent_requests().find_by_id(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RentRequestStatus::Paid);
    }

    #[tokio::test]
    async fn pay_is_idempotent_per_key() {
        let f = fixture().await;
        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();

        let first = f
            .service
            .pay(request.id, f.renter, UserRole::Renter, "key-1")
            .await
            .unwrap();
        let second = f
            .service
            .pay(request.id, f.renter, UserRole::Renter, "key-1")
            .await
            .unwrap();

        assert_eq!(first, second);

        let records = f
            .repos
            .payments()
            .find_by_rent_request(request.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn pay_with_new_key_after_paid_conflicts() {
        let f = fixture().await;
        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();
        f.service
            .pay(request.id, f.renter, UserRole::Renter, "key-1")
            .await
            .unwrap();

        let err = f
            .service
            .pay(request.id, f.renter, UserRole::Renter, "key-2")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn pay_requires_renter() {
        let f = fixture().await;
        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();

        let err = f
            .service
            .pay(request.id, f.owner, UserRole::Owner, "key-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn transitions_emit_events() {
        let f = fixture().await;
        let mut subscriber = f.bus.subscribe();

        let request = create_request(&f).await;
        f.service.confirm(request.id, f.owner, UserRole::Owner).await.unwrap();

        let created = subscriber.try_recv().expect("created event");
        assert_eq!(created.event.event_type(), "rent_request_created");
        let confirmed = subscriber.try_recv().expect("confirmed event");
        assert_eq!(confirmed.event.event_type(), "rent_request_confirmed");
        assert_eq!(confirmed.event.rent_request_id(), request.id);
    }

    #[tokio::test]
    async fn list_splits_by_side() {
        let f = fixture().await;
        create_request(&f).await;
        create_request(&f).await;

        let as_renter = f.service.list(f.renter, false, 1, 10).await.unwrap();
        assert_eq!(as_renter.total, 2);
        assert!(as_renter.items[0].property.is_some());
        assert!(as_renter.items[0].renter.is_some());

        let as_owner = f.service.list(f.owner, true, 1, 10).await.unwrap();
        assert_eq!(as_owner.total, 2);

        let stranger = f.service.list(Uuid::new_v4(), false, 1, 10).await.unwrap();
        assert_eq!(stranger.total, 0);
    }

    #[tokio::test]
    async fn get_is_party_or_agent_only() {
        let f = fixture().await;
        let request = create_request(&f).await;

        assert!(f.service.get(request.id, f.renter, UserRole::Renter).await.is_ok());
        assert!(f.service.get(request.id, f.owner, UserRole::Owner).await.is_ok());
        assert!(f
            .service
            .get(request.id, Uuid::new_v4(), UserRole::Agent)
            .await
            .is_ok());

        let err = f
            .service
            .get(request.id, Uuid::new_v4(), UserRole::Renter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
