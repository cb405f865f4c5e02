//! Checkout workflow service
//!
//! Runs the checkout-and-dispute phase of a paid rental: the renter's
//! checkout request, owner confirmation or rejection, agent arbitration and
//! timeout auto-confirmation all converge on one atomic settlement write
//! that splits the escrowed deposit and completes the rental.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::events::SharedEventBus;
use crate::domain::access::{self, AllowedActions};
use crate::domain::checkout::{
    AgentDecision, Checkout, CheckoutKind, OwnerConfirmation, SettlementWrite,
};
use crate::domain::events::{CheckoutEventData, Event, SettlementEventData};
use crate::domain::rent_request::{RentRequest, RentRequestStatus};
use crate::domain::settlement::{calculator::split_deposit, SettlementBreakdown};
use crate::domain::user::UserRole;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::is_blank;

/// Checkout state as presented to one actor: the canonical server state, a
/// human-readable summary and the actions that actor may take right now.
#[derive(Debug, Clone)]
pub struct CheckoutStatusView {
    pub rent_request: RentRequest,
    pub checkout: Option<Checkout>,
    pub message: String,
    pub actions: AllowedActions,
}

/// Service for checkout operations
pub struct CheckoutService {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
}

impl CheckoutService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, event_bus: SharedEventBus) -> Self {
        Self { repos, event_bus }
    }

    /// Renter requests checkout of a paid rental.
    ///
    /// At most one checkout per rental. `EarlyRelease` checkouts waive the
    /// owner review and settle immediately with full deposit return.
    pub async fn request_checkout(
        &self,
        rent_request_id: Uuid,
        actor_id: Uuid,
        role: UserRole,
        kind: CheckoutKind,
        reason: Option<String>,
    ) -> DomainResult<Checkout> {
        let request = self.load_request(rent_request_id).await?;

        if let Some(existing) = self
            .repos
            .checkouts()
            .find_by_rent_request(rent_request_id)
            .await?
        {
            return Err(DomainError::CheckoutExists(existing.rent_request_id));
        }

        if !access::can_request_checkout(&request, None, actor_id, role) {
            if actor_id != request.renter_id {
                return Err(DomainError::Forbidden(
                    "only the renter of record may request checkout".to_string(),
                ));
            }
            return Err(DomainError::InvalidTransition {
                entity: "rent request",
                from: request.status.as_str().to_string(),
                action: "checkout",
            });
        }

        let checkout = Checkout::new(rent_request_id, kind, reason);
        self.repos.checkouts().save(checkout.clone()).await?;

        info!(
            checkout_id = %checkout.id,
            rent_request_id = %rent_request_id,
            kind = kind.as_str(),
            "Checkout requested"
        );
        metrics::counter!("checkout_transitions_total", "action" => "request").increment(1);
        self.event_bus
            .publish(Event::CheckoutRequested(checkout_event(&checkout)));

        if kind.requires_owner_confirmation() {
            return Ok(checkout);
        }

        // Review waived: settle immediately with full deposit return
        let breakdown = split_deposit(
            request.deposit_amount,
            Decimal::ONE_HUNDRED,
            request.rent_amount,
            false,
        )?;
        self.settle(
            &checkout,
            OwnerConfirmation::NotRequired,
            OwnerConfirmation::NotRequired,
            None,
            breakdown,
            None,
        )
        .await
    }

    /// Owner confirms the property is fine.
    ///
    /// Full deposit return, rent released to the owner, no agent step.
    pub async fn owner_confirm(
        &self,
        checkout_id: Uuid,
        actor_id: Uuid,
        role: UserRole,
        damage_notes: Option<String>,
    ) -> DomainResult<Checkout> {
        let checkout = self.load_checkout(checkout_id).await?;
        let request = self.load_request(checkout.rent_request_id).await?;
        self.ensure_owner_may_act(&request, &checkout, actor_id, role)?;

        let breakdown = split_deposit(
            request.deposit_amount,
            Decimal::ONE_HUNDRED,
            request.rent_amount,
            false,
        )?;
        let settled = self
            .settle(
                &checkout,
                OwnerConfirmation::Pending,
                OwnerConfirmation::Confirmed,
                damage_notes,
                breakdown,
                None,
            )
            .await?;

        info!(checkout_id = %checkout_id, "Checkout confirmed by owner");
        metrics::counter!("checkout_transitions_total", "action" => "owner_confirm").increment(1);
        self.event_bus
            .publish(Event::CheckoutOwnerConfirmed(checkout_event(&settled)));
        Ok(settled)
    }

    /// Owner reports damage, escalating the dispute to agent review.
    ///
    /// `damage_notes` must be non-empty; validation runs before any state
    /// is touched.
    pub async fn owner_reject(
        &self,
        checkout_id: Uuid,
        actor_id: Uuid,
        role: UserRole,
        damage_notes: String,
    ) -> DomainResult<Checkout> {
        if is_blank(&damage_notes) {
            return Err(DomainError::Validation(
                "damage_notes are required when rejecting a checkout".to_string(),
            ));
        }

        let checkout = self.load_checkout(checkout_id).await?;
        let request = self.load_request(checkout.rent_request_id).await?;
        self.ensure_owner_may_act(&request, &checkout, actor_id, role)?;

        let updated = self
            .repos
            .checkouts()
            .resolve_owner_confirmation(checkout_id, OwnerConfirmation::Rejected, Some(damage_notes))
            .await?;

        info!(checkout_id = %checkout_id, "Checkout rejected by owner, dispute escalated");
        metrics::counter!("checkout_transitions_total", "action" => "owner_reject").increment(1);
        self.event_bus
            .publish(Event::CheckoutOwnerRejected(checkout_event(&updated)));
        Ok(updated)
    }

    /// Agent resolves a disputed (or review-waived) checkout.
    ///
    /// Records an immutable decision, splits the deposit per the ruling and
    /// settles the checkout in one atomic write.
    pub async fn agent_decide(
        &self,
        checkout_id: Uuid,
        actor_id: Uuid,
        role: UserRole,
        deposit_return_percent: Decimal,
        rent_returned: bool,
        notes: String,
    ) -> DomainResult<Checkout> {
        if is_blank(&notes) {
            return Err(DomainError::Validation(
                "notes are required for an agent decision".to_string(),
            ));
        }

        let checkout = self.load_checkout(checkout_id).await?;
        if !role.can_arbitrate() {
            return Err(DomainError::Forbidden(
                "only support agents may decide checkouts".to_string(),
            ));
        }
        if !access::can_agent_decide(&checkout, role) {
            if checkout.is_settled() {
                return Err(DomainError::AlreadyResolved(format!(
                    "checkout {} is already settled",
                    checkout_id
                )));
            }
            return Err(DomainError::Conflict(format!(
                "checkout {} is not awaiting an agent decision (owner confirmation is '{}')",
                checkout_id, checkout.owner_confirmation
            )));
        }

        let request = self.load_request(checkout.rent_request_id).await?;
        let breakdown = split_deposit(
            request.deposit_amount,
            deposit_return_percent,
            request.rent_amount,
            rent_returned,
        )?;
        let decision = AgentDecision::new(
            checkout_id,
            actor_id,
            deposit_return_percent,
            rent_returned,
            notes,
        );

        let settled = self
            .settle(
                &checkout,
                checkout.owner_confirmation,
                checkout.owner_confirmation,
                None,
                breakdown,
                Some(decision),
            )
            .await?;

        info!(
            checkout_id = %checkout_id,
            agent_id = %actor_id,
            percent = %deposit_return_percent,
            rent_returned,
            "Checkout resolved by agent decision"
        );
        metrics::counter!("checkout_transitions_total", "action" => "agent_decide").increment(1);
        self.event_bus
            .publish(Event::CheckoutAgentDecided(checkout_event(&settled)));
        Ok(settled)
    }

    /// Auto-confirm checkouts whose owner window elapsed without action.
    ///
    /// Invoked by the timeout sweep. Idempotent: the conditional settlement
    /// write makes a second sweep (or a racing owner action) a no-op per
    /// checkout. Returns how many checkouts were auto-confirmed.
    pub async fn auto_confirm_overdue(&self, window: Duration) -> DomainResult<usize> {
        let cutoff = Utc::now() - window;
        let overdue = self.repos.checkouts().find_overdue(cutoff).await?;

        if overdue.is_empty() {
            return Ok(0);
        }

        info!(count = overdue.len(), "Auto-confirming overdue checkouts");

        let mut applied = 0;
        for checkout in overdue {
            let request = match self.load_request(checkout.rent_request_id).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(checkout_id = %checkout.id, error = %e, "Skipping orphaned checkout");
                    continue;
                }
            };
            let breakdown = split_deposit(
                request.deposit_amount,
                Decimal::ONE_HUNDRED,
                request.rent_amount,
                false,
            )?;
            match self
                .settle(
                    &checkout,
                    OwnerConfirmation::Pending,
                    OwnerConfirmation::AutoConfirmed,
                    None,
                    breakdown,
                    None,
                )
                .await
            {
                Ok(settled) => {
                    applied += 1;
                    metrics::counter!("checkout_transitions_total", "action" => "auto_confirm")
                        .increment(1);
                    self.event_bus
                        .publish(Event::CheckoutAutoConfirmed(checkout_event(&settled)));
                }
                Err(DomainError::AlreadyResolved(_)) => {
                    // Owner acted (or another sweep won) between find and write
                    continue;
                }
                Err(e) => {
                    warn!(checkout_id = %checkout.id, error = %e, "Auto-confirm failed");
                }
            }
        }

        Ok(applied)
    }

    /// Current checkout state for one rental, shaped for the calling actor
    pub async fn checkout_status(
        &self,
        rent_request_id: Uuid,
        actor_id: Uuid,
        role: UserRole,
    ) -> DomainResult<CheckoutStatusView> {
        let request = self.load_request(rent_request_id).await?;
        if actor_id != request.renter_id && actor_id != request.owner_id && !role.can_arbitrate() {
            return Err(DomainError::Forbidden(
                "only the renter, the owner or an agent may view this checkout".to_string(),
            ));
        }

        let checkout = self
            .repos
            .checkouts()
            .find_by_rent_request(rent_request_id)
            .await?;
        let message = describe(&request, checkout.as_ref());
        let actions = AllowedActions::for_actor(&request, checkout.as_ref(), actor_id, role);

        Ok(CheckoutStatusView {
            rent_request: request,
            checkout,
            message,
            actions,
        })
    }

    /// Checkouts eligible for an agent decision (agent queue)
    pub async fn list_awaiting_decision(&self, role: UserRole) -> DomainResult<Vec<Checkout>> {
        if !role.can_arbitrate() {
            return Err(DomainError::Forbidden(
                "only support agents may list the decision queue".to_string(),
            ));
        }
        self.repos.checkouts().find_awaiting_decision().await
    }

    // ── Internals ──────────────────────────────────────────────

    /// One atomic settlement: conditional on `expected`, writes the split,
    /// the final confirmation, the optional decision record, and completes
    /// the rent request. Publishes the settled event on success.
    async fn settle(
        &self,
        checkout: &Checkout,
        expected: OwnerConfirmation,
        confirmation: OwnerConfirmation,
        owner_notes: Option<String>,
        breakdown: SettlementBreakdown,
        decision: Option<AgentDecision>,
    ) -> DomainResult<Checkout> {
        let decided_by_agent = decision.is_some();
        let write = SettlementWrite {
            checkout_id: checkout.id,
            expected_confirmation: expected,
            confirmation,
            owner_notes,
            breakdown,
            refund_purchase_id: Uuid::new_v4(),
            payout_purchase_id: Uuid::new_v4(),
            decision,
            resolved_at: Utc::now(),
        };
        let settled = self.repos.checkouts().settle(write).await?;

        self.event_bus.publish(Event::CheckoutSettled(SettlementEventData {
            checkout_id: settled.id,
            rent_request_id: settled.rent_request_id,
            final_refund_amount: settled
                .final_refund_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            final_payout_amount: settled
                .final_payout_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            deposit_return_percent: settled
                .deposit_return_percent
                .map(|p| p.to_string())
                .unwrap_or_default(),
            decided_by_agent,
        }));
        metrics::counter!("checkout_settlements_total").increment(1);

        Ok(settled)
    }

    fn ensure_owner_may_act(
        &self,
        request: &RentRequest,
        checkout: &Checkout,
        actor_id: Uuid,
        role: UserRole,
    ) -> DomainResult<()> {
        if access::can_owner_act(request, checkout, actor_id, role) {
            return Ok(());
        }
        if actor_id != request.owner_id {
            return Err(DomainError::Forbidden(
                "only the property owner of record may act on this checkout".to_string(),
            ));
        }
        Err(DomainError::AlreadyResolved(format!(
            "checkout {} owner confirmation is '{}'",
            checkout.id, checkout.owner_confirmation
        )))
    }

    async fn load_request(&self, id: Uuid) -> DomainResult<RentRequest> {
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

    async fn load_checkout(&self, id: Uuid) -> DomainResult<Checkout> {
        self.repos
            .checkouts()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Checkout",
                field: "id",
                value: id.to_string(),
            })
    }
}

fn checkout_event(checkout: &Checkout) -> CheckoutEventData {
    CheckoutEventData {
        checkout_id: checkout.id,
        rent_request_id: checkout.rent_request_id,
        owner_confirmation: checkout.owner_confirmation.as_str().to_string(),
    }
}

/// Human-readable summary of where the checkout stands
fn describe(request: &RentRequest, checkout: Option<&Checkout>) -> String {
    let Some(checkout) = checkout else {
        return match request.status {
            RentRequestStatus::Paid => "No checkout requested yet.".to_string(),
            status => format!("Rental is {}; checkout is not available.", status),
        };
    };

    if checkout.is_settled() {
        let percent = checkout
            .deposit_return_percent
            .map(|p| p.normalize().to_string())
            .unwrap_or_else(|| "?".to_string());
        return format!(
            "Checkout settled: {}% of the deposit returned to the renter.",
            percent
        );
    }
    if checkout.is_disputed() {
        return "Owner rejected the checkout; awaiting agent decision.".to_string();
    }
    if checkout.awaiting_owner() {
        return "Checkout requested; awaiting owner confirmation.".to_string();
    }
    "Checkout is being settled.".to_string()
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::services::rent_request::RentRequestService;
    use crate::domain::property::Property;
    use crate::domain::user::User;
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        rent_requests: RentRequestService,
        checkouts: CheckoutService,
        renter: Uuid,
        owner: Uuid,
        agent: Uuid,
        property: Uuid,
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let bus = create_event_bus();

        let renter = User::new("Rita Renter", "rita@example.com", UserRole::Renter);
        let owner = User::new("Omar Owner", "omar@example.com", UserRole::Owner);
        let agent = User::new("Ana Agent", "ana@example.com", UserRole::Agent);
        let property = Property::new(
            owner.id,
            "Sunny flat",
            "12 Elm Street",
            dec("1200.00"),
            dec("600.00"),
            "USD",
        );

        let ids = (renter.id, owner.id, agent.id, property.id);

        repos.users().save(renter).await.unwrap();
        repos.users().save(owner).await.unwrap();
        repos.users().save(agent).await.unwrap();
        repos.properties().save(property).await.unwrap();

        let rent_requests = RentRequestService::new(
            repos.clone() as Arc<dyn RepositoryProvider>,
            bus.clone(),
            None,
        );
        let checkouts =
            CheckoutService::new(repos.clone() as Arc<dyn RepositoryProvider>, bus.clone());

        Fixture {
            repos,
            rent_requests,
            checkouts,
            renter: ids.0,
            owner: ids.1,
            agent: ids.2,
            property: ids.3,
        }
    }

    /// pending -> confirmed -> paid
    async fn paid_rental(f: &Fixture) -> RentRequest {
        let request = f
            .rent_requests
            .create(
                f.renter,
                f.property,
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            )
            .await
            .unwrap();
        f.rent_requests
            .confirm(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap();
        f.rent_requests
            .pay(request.id, f.renter, UserRole::Renter, "pay-key")
            .await
            .unwrap();
        f.repos
            .rent_requests()
            .find_by_id(request.id)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn checkout_requires_paid_rental() {
        let f = fixture().await;
        let request = f
            .rent_requests
            .create(
                f.renter,
                f.property,
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            )
            .await
            .unwrap();

        let err = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn at_most_one_checkout_per_rental() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        f.checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();
        let err = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CheckoutExists(_)));
    }

    #[tokio::test]
    async fn checkout_is_renter_only() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let err = f
            .checkouts
            .request_checkout(request.id, f.owner, UserRole::Owner, CheckoutKind::Normal, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn scenario_a_owner_confirms_full_return() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();
        assert!(checkout.awaiting_owner());

        let settled = f
            .checkouts
            .owner_confirm(checkout.id, f.owner, UserRole::Owner, None)
            .await
            .unwrap();

        assert!(settled.is_settled());
        assert_eq!(settled.owner_confirmation, OwnerConfirmation::Confirmed);
        assert_eq!(settled.deposit_return_percent, Some(Decimal::ONE_HUNDRED));
        assert_eq!(settled.final_refund_amount, Some(dec("600.00")));
        // payout includes the full rent
        assert_eq!(settled.final_payout_amount, Some(dec("1200.00")));
        assert!(settled.refund_purchase_id.is_some());
        assert!(settled.payout_purchase_id.is_some());

        let completed = f
            .repos
            .rent_requests()
            .find_by_id(request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, RentRequestStatus::Completed);
    }

    #[tokio::test]
    async fn scenario_b_dispute_resolved_by_agent() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        let rejected = f
            .checkouts
            .owner_reject(
                checkout.id,
                f.owner,
                UserRole::Owner,
                "broken window".to_string(),
            )
            .await
            .unwrap();
        assert!(rejected.is_disputed());
        assert_eq!(rejected.owner_notes.as_deref(), Some("broken window"));

        let settled = f
            .checkouts
            .agent_decide(
                checkout.id,
                f.agent,
                UserRole::Agent,
                dec("40"),
                false,
                "partial damage confirmed".to_string(),
            )
            .await
            .unwrap();

        assert!(settled.is_settled());
        assert_eq!(settled.final_refund_amount, Some(dec("240.00")));
        assert_eq!(settled.final_payout_amount, Some(dec("1560.00")));

        let decision = f
            .repos
            .decisions()
            .find_by_checkout(checkout.id)
            .await
            .unwrap()
            .expect("decision recorded");
        assert_eq!(decision.decided_by, f.agent);
        assert_eq!(decision.deposit_return_percent, dec("40"));
        assert!(!decision.rent_returned);

        let completed = f
            .repos
            .rent_requests()
            .find_by_id(request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, RentRequestStatus::Completed);
    }

    #[tokio::test]
    async fn scenario_c_owner_silence_auto_confirms() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        // Checkout requested 73 hours ago, owner never responded
        let mut checkout = Checkout::new(request.id, CheckoutKind::Normal, None);
        checkout.requested_at = Utc::now() - Duration::hours(73);
        f.repos.checkouts().save(checkout.clone()).await.unwrap();

        let applied = f
            .checkouts
            .auto_confirm_overdue(Duration::hours(72))
            .await
            .unwrap();
        assert_eq!(applied, 1);

        let settled = f
            .repos
            .checkouts()
            .find_by_id(checkout.id)
            .await
            .unwrap()
            .unwrap();
        assert!(settled.is_settled());
        assert_eq!(settled.owner_confirmation, OwnerConfirmation::AutoConfirmed);
        assert_eq!(settled.deposit_return_percent, Some(Decimal::ONE_HUNDRED));
        assert_eq!(settled.final_refund_amount, Some(dec("600.00")));

        let completed = f
            .repos
            .rent_requests()
            .find_by_id(request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, RentRequestStatus::Completed);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let mut checkout = Checkout::new(request.id, CheckoutKind::Normal, None);
        checkout.requested_at = Utc::now() - Duration::hours(80);
        f.repos.checkouts().save(checkout.clone()).await.unwrap();

        let first = f.checkouts.auto_confirm_overdue(Duration::hours(72)).await.unwrap();
        let second = f.checkouts.auto_confirm_overdue(Duration::hours(72)).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn sweep_leaves_fresh_checkouts_alone() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        let applied = f.checkouts.auto_confirm_overdue(Duration::hours(72)).await.unwrap();
        assert_eq!(applied, 0);

        let stored = f.repos.checkouts().find_by_id(checkout.id).await.unwrap().unwrap();
        assert!(stored.awaiting_owner());
    }

    #[tokio::test]
    async fn owner_reject_with_blank_notes_mutates_nothing() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        let err = f
            .checkouts
            .owner_reject(checkout.id, f.owner, UserRole::Owner, "   ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = f.repos.checkouts().find_by_id(checkout.id).await.unwrap().unwrap();
        assert!(stored.awaiting_owner());
        assert!(stored.owner_notes.is_none());
    }

    #[tokio::test]
    async fn second_owner_action_is_rejected() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        f.checkouts
            .owner_confirm(checkout.id, f.owner, UserRole::Owner, None)
            .await
            .unwrap();
        let err = f
            .checkouts
            .owner_reject(checkout.id, f.owner, UserRole::Owner, "too late".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyResolved(_)));
    }

    #[tokio::test]
    async fn agent_cannot_override_confirmed_checkout() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();
        f.checkouts
            .owner_confirm(checkout.id, f.owner, UserRole::Owner, None)
            .await
            .unwrap();

        let err = f
            .checkouts
            .agent_decide(
                checkout.id,
                f.agent,
                UserRole::Agent,
                dec("50"),
                false,
                "attempted override".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyResolved(_)));
    }

    #[tokio::test]
    async fn agent_decide_validates_inputs() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();
        f.checkouts
            .owner_reject(checkout.id, f.owner, UserRole::Owner, "stained carpet".to_string())
            .await
            .unwrap();

        let err = f
            .checkouts
            .agent_decide(checkout.id, f.agent, UserRole::Agent, dec("50"), false, "  ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f
            .checkouts
            .agent_decide(
                checkout.id,
                f.agent,
                UserRole::Agent,
                dec("101"),
                false,
                "out of range".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f
            .checkouts
            .agent_decide(
                checkout.id,
                f.renter,
                UserRole::Renter,
                dec("50"),
                false,
                "not an agent".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // the dispute is still open after all the failed attempts
        let stored = f.repos.checkouts().find_by_id(checkout.id).await.unwrap().unwrap();
        assert!(stored.is_disputed());
    }

    #[tokio::test]
    async fn agent_decision_can_return_rent() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();
        f.checkouts
            .owner_reject(checkout.id, f.owner, UserRole::Owner, "no hot water".to_string())
            .await
            .unwrap();

        let settled = f
            .checkouts
            .agent_decide(
                checkout.id,
                f.agent,
                UserRole::Agent,
                Decimal::ONE_HUNDRED,
                true,
                "uninhabitable, refund everything".to_string(),
            )
            .await
            .unwrap();

        // deposit and rent both go back to the renter
        assert_eq!(settled.final_refund_amount, Some(dec("1800.00")));
        assert_eq!(settled.final_payout_amount, Some(dec("0.00")));
    }

    #[tokio::test]
    async fn early_release_settles_immediately() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let settled = f
            .checkouts
            .request_checkout(
                request.id,
                f.renter,
                UserRole::Renter,
                CheckoutKind::EarlyRelease,
                Some("moving out early".to_string()),
            )
            .await
            .unwrap();

        assert!(settled.is_settled());
        assert_eq!(settled.owner_confirmation, OwnerConfirmation::NotRequired);
        assert_eq!(settled.final_refund_amount, Some(dec("600.00")));
        assert_eq!(settled.final_payout_amount, Some(dec("1200.00")));

        let completed = f
            .repos
            .rent_requests()
            .find_by_id(request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, RentRequestStatus::Completed);
    }

    #[tokio::test]
    async fn status_view_reflects_workflow() {
        let f = fixture().await;
        let request = paid_rental(&f).await;

        let view = f
            .checkouts
            .checkout_status(request.id, f.renter, UserRole::Renter)
            .await
            .unwrap();
        assert!(view.checkout.is_none());
        assert_eq!(view.message, "No checkout requested yet.");
        assert!(view.actions.can_request_checkout);

        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        let renter_view = f
            .checkouts
            .checkout_status(request.id, f.renter, UserRole::Renter)
            .await
            .unwrap();
        assert!(renter_view.message.contains("awaiting owner"));
        assert!(!renter_view.actions.can_owner_confirm);

        let owner_view = f
            .checkouts
            .checkout_status(request.id, f.owner, UserRole::Owner)
            .await
            .unwrap();
        assert!(owner_view.actions.can_owner_confirm);
        assert!(owner_view.actions.can_owner_reject);

        let err = f
            .checkouts
            .checkout_status(request.id, Uuid::new_v4(), UserRole::Renter)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        f.checkouts
            .owner_confirm(checkout.id, f.owner, UserRole::Owner, None)
            .await
            .unwrap();
        let settled_view = f
            .checkouts
            .checkout_status(request.id, f.renter, UserRole::Renter)
            .await
            .unwrap();
        assert!(settled_view.message.contains("settled"));
        assert!(settled_view.message.contains("100%"));
    }

    #[tokio::test]
    async fn decision_queue_lists_disputes_and_waived_reviews() {
        let f = fixture().await;
        let request = paid_rental(&f).await;
        let checkout = f
            .checkouts
            .request_checkout(request.id, f.renter, UserRole::Renter, CheckoutKind::Normal, None)
            .await
            .unwrap();

        // pending owner review: not in the queue yet
        let queue = f.checkouts.list_awaiting_decision(UserRole::Agent).await.unwrap();
        assert!(queue.is_empty());

        f.checkouts
            .owner_reject(checkout.id, f.owner, UserRole::Owner, "dent in wall".to_string())
            .await
            .unwrap();

        let queue = f.checkouts.list_awaiting_decision(UserRole::Agent).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, checkout.id);

        let err = f
            .checkouts
            .list_awaiting_decision(UserRole::Owner)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
