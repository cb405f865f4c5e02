//! Access control guard
//!
//! Stateless predicates deciding which action an actor may invoke given the
//! current state. The single source of truth for both server-side
//! authorization and the action flags returned to clients, so the two can
//! never drift apart.

use uuid::Uuid;

use crate::domain::checkout::{Checkout, OwnerConfirmation};
use crate::domain::rent_request::{RentRequest, RentRequestStatus};
use crate::domain::user::UserRole;

/// Owner of record may accept a pending request
pub fn can_confirm_request(request: &RentRequest, actor_id: Uuid, _role: UserRole) -> bool {
    actor_id == request.owner_id && request.status == RentRequestStatus::Pending
}

/// Owner of record may decline a pending request
pub fn can_reject_request(request: &RentRequest, actor_id: Uuid, role: UserRole) -> bool {
    can_confirm_request(request, actor_id, role)
}

/// Renter of record may withdraw a confirmed request
pub fn can_cancel_request(request: &RentRequest, actor_id: Uuid, _role: UserRole) -> bool {
    actor_id == request.renter_id && request.status == RentRequestStatus::Confirmed
}

/// Owner of record may withdraw a confirmed request
pub fn can_cancel_confirmed(request: &RentRequest, actor_id: Uuid, _role: UserRole) -> bool {
    actor_id == request.owner_id && request.status == RentRequestStatus::Confirmed
}

/// Renter of record may pay a confirmed request
pub fn can_pay(request: &RentRequest, actor_id: Uuid, _role: UserRole) -> bool {
    actor_id == request.renter_id && request.status == RentRequestStatus::Confirmed
}

/// Renter of record may request checkout of a paid rental without one
pub fn can_request_checkout(
    request: &RentRequest,
    checkout: Option<&Checkout>,
    actor_id: Uuid,
    _role: UserRole,
) -> bool {
    actor_id == request.renter_id
        && request.status == RentRequestStatus::Paid
        && checkout.is_none()
}

/// Owner of record may confirm or reject while the checkout awaits them
pub fn can_owner_act(
    request: &RentRequest,
    checkout: &Checkout,
    actor_id: Uuid,
    _role: UserRole,
) -> bool {
    actor_id == request.owner_id && checkout.owner_confirmation == OwnerConfirmation::Pending
}

/// Agents may decide disputed (or review-waived) checkouts that are not yet
/// settled. An agent can never override a confirmed or auto-confirmed
/// resolution.
pub fn can_agent_decide(checkout: &Checkout, role: UserRole) -> bool {
    role.can_arbitrate()
        && matches!(
            checkout.owner_confirmation,
            OwnerConfirmation::Rejected | OwnerConfirmation::NotRequired
        )
        && !checkout.is_settled()
}

/// Action flags for one actor against one rental, mirrored to clients so
/// button enablement follows exactly the server's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedActions {
    pub can_confirm: bool,
    pub can_reject: bool,
    pub can_cancel: bool,
    pub can_cancel_confirmed: bool,
    pub can_pay: bool,
    pub can_request_checkout: bool,
    pub can_owner_confirm: bool,
    pub can_owner_reject: bool,
    pub can_agent_decide: bool,
}

impl AllowedActions {
    pub fn for_actor(
        request: &RentRequest,
        checkout: Option<&Checkout>,
        actor_id: Uuid,
        role: UserRole,
    ) -> Self {
        let owner_act = checkout
            .map(|c| can_owner_act(request, c, actor_id, role))
            .unwrap_or(false);
        Self {
            can_confirm: can_confirm_request(request, actor_id, role),
            can_reject: can_reject_request(request, actor_id, role),
            can_cancel: can_cancel_request(request, actor_id, role),
            can_cancel_confirmed: can_cancel_confirmed(request, actor_id, role),
            can_pay: can_pay(request, actor_id, role),
            can_request_checkout: can_request_checkout(request, checkout, actor_id, role),
            can_owner_confirm: owner_act,
            can_owner_reject: owner_act,
            can_agent_decide: checkout
                .map(|c| can_agent_decide(c, role))
                .unwrap_or(false),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::CheckoutKind;
    use chrono::NaiveDate;

    fn request_with(status: RentRequestStatus) -> (RentRequest, Uuid, Uuid) {
        let renter = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let mut r = RentRequest::new(
            Uuid::new_v4(),
            renter,
            owner,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            "1200.00".parse().unwrap(),
            "600.00".parse().unwrap(),
            "USD",
        )
        .unwrap();
        r.status = status;
        (r, renter, owner)
    }

    #[test]
    fn only_the_owner_confirms_pending_requests() {
        let (r, renter, owner) = request_with(RentRequestStatus::Pending);
        assert!(can_confirm_request(&r, owner, UserRole::Owner));
        assert!(!can_confirm_request(&r, renter, UserRole::Renter));
        assert!(!can_confirm_request(&r, Uuid::new_v4(), UserRole::Agent));
    }

    #[test]
    fn confirm_denied_outside_pending() {
        let (r, _, owner) = request_with(RentRequestStatus::Confirmed);
        assert!(!can_confirm_request(&r, owner, UserRole::Owner));
    }

    #[test]
    fn renter_cancels_owner_cancels_confirmed() {
        let (r, renter, owner) = request_with(RentRequestStatus::Confirmed);
        assert!(can_cancel_request(&r, renter, UserRole::Renter));
        assert!(!can_cancel_request(&r, owner, UserRole::Owner));
        assert!(can_cancel_confirmed(&r, owner, UserRole::Owner));
        assert!(!can_cancel_confirmed(&r, renter, UserRole::Renter));
    }

    #[test]
    fn pay_is_renter_only_from_confirmed() {
        let (r, renter, owner) = request_with(RentRequestStatus::Confirmed);
        assert!(can_pay(&r, renter, UserRole::Renter));
        assert!(!can_pay(&r, owner, UserRole::Owner));

        let (r, renter, _) = request_with(RentRequestStatus::Paid);
        assert!(!can_pay(&r, renter, UserRole::Renter));
    }

    #[test]
    fn checkout_request_needs_paid_and_no_checkout() {
        let (r, renter, _) = request_with(RentRequestStatus::Paid);
        assert!(can_request_checkout(&r, None, renter, UserRole::Renter));

        let existing = Checkout::new(r.id, CheckoutKind::Normal, None);
        assert!(!can_request_checkout(&r, Some(&existing), renter, UserRole::Renter));

        let (unpaid, renter, _) = request_with(RentRequestStatus::Confirmed);
        assert!(!can_request_checkout(&unpaid, None, renter, UserRole::Renter));
    }

    #[test]
    fn owner_acts_only_while_pending_confirmation() {
        let (r, renter, owner) = request_with(RentRequestStatus::Paid);
        let mut c = Checkout::new(r.id, CheckoutKind::Normal, None);
        assert!(can_owner_act(&r, &c, owner, UserRole::Owner));
        assert!(!can_owner_act(&r, &c, renter, UserRole::Renter));

        c.confirm_by_owner(None).unwrap();
        assert!(!can_owner_act(&r, &c, owner, UserRole::Owner));
    }

    #[test]
    fn agent_decides_rejected_and_not_required_only() {
        let (r, ..) = request_with(RentRequestStatus::Paid);

        let mut rejected = Checkout::new(r.id, CheckoutKind::Normal, None);
        rejected.reject_by_owner("broken window".to_string()).unwrap();
        assert!(can_agent_decide(&rejected, UserRole::Agent));
        assert!(can_agent_decide(&rejected, UserRole::Admin));
        assert!(!can_agent_decide(&rejected, UserRole::Owner));
        assert!(!can_agent_decide(&rejected, UserRole::Renter));

        let waived = Checkout::new(r.id, CheckoutKind::EarlyRelease, None);
        assert!(can_agent_decide(&waived, UserRole::Agent));

        let mut confirmed = Checkout::new(r.id, CheckoutKind::Normal, None);
        confirmed.confirm_by_owner(None).unwrap();
        assert!(!can_agent_decide(&confirmed, UserRole::Agent));

        let mut auto = Checkout::new(r.id, CheckoutKind::Normal, None);
        auto.auto_confirm().unwrap();
        assert!(!can_agent_decide(&auto, UserRole::Agent));
    }

    #[test]
    fn allowed_actions_mirror_predicates() {
        let (r, renter, owner) = request_with(RentRequestStatus::Pending);

        let for_owner = AllowedActions::for_actor(&r, None, owner, UserRole::Owner);
        assert!(for_owner.can_confirm && for_owner.can_reject);
        assert!(!for_owner.can_pay && !for_owner.can_request_checkout);

        let for_renter = AllowedActions::for_actor(&r, None, renter, UserRole::Renter);
        assert!(!for_renter.can_confirm);
        assert!(!for_renter.can_pay); // not confirmed yet
    }
}
