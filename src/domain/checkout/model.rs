//! Checkout domain entity
//!
//! The end-of-stay settlement process deciding deposit disposition. Exists
//! at most once per rent request, and only after payment. Resolved by the
//! owner (confirm/reject), by the timeout sweep (auto-confirm), or by an
//! agent decision after a dispute.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::settlement::SettlementBreakdown;

/// Checkout kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    /// Regular end-of-stay checkout, owner reviews the property first
    Normal,
    /// Early checkout under a policy that waives owner review
    EarlyRelease,
}

impl CheckoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::EarlyRelease => "early_release",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "early_release" => Some(Self::EarlyRelease),
            _ => None,
        }
    }

    /// Whether the owner must confirm before funds move
    pub fn requires_owner_confirmation(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Checkout status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStatus {
    /// Awaiting owner action or agent decision
    Pending,
    /// Owner confirmed, settlement in flight
    Confirmed,
    /// Timeout sweep confirmed on the owner's behalf
    AutoConfirmed,
    /// Settlement recorded, funds dispatched
    Completed,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::AutoConfirmed => "auto_confirmed",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "confirmed" => Self::Confirmed,
            "auto_confirmed" => Self::AutoConfirmed,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Owner confirmation state, the serialization point for every resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerConfirmation {
    /// Checkout kind waives owner review
    NotRequired,
    /// Awaiting the owner
    Pending,
    /// Owner confirmed the property is fine
    Confirmed,
    /// Owner reported damage, dispute escalated to an agent
    Rejected,
    /// 72h window elapsed with no owner action
    AutoConfirmed,
}

impl OwnerConfirmation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequired => "not_required",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::AutoConfirmed => "auto_confirmed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "not_required" => Self::NotRequired,
            "confirmed" => Self::Confirmed,
            "rejected" => Self::Rejected,
            "auto_confirmed" => Self::AutoConfirmed,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for OwnerConfirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// End-of-stay checkout for a paid rental
#[derive(Debug, Clone)]
pub struct Checkout {
    pub id: Uuid,
    /// 1:1 with the active rental
    pub rent_request_id: Uuid,
    pub kind: CheckoutKind,
    pub status: CheckoutStatus,
    pub owner_confirmation: OwnerConfirmation,
    /// Renter-supplied reason, optional
    pub reason: Option<String>,
    /// Owner damage notes, required when rejecting
    pub owner_notes: Option<String>,
    /// Share of the deposit returned to the renter, set when resolved
    pub deposit_return_percent: Option<Decimal>,
    /// Amount returned to the renter, set when resolved
    pub final_refund_amount: Option<Decimal>,
    /// Amount released to the owner, set when resolved
    pub final_payout_amount: Option<Decimal>,
    pub refund_purchase_id: Option<Uuid>,
    pub payout_purchase_id: Option<Uuid>,
    /// External gateway reference for the original escrow payment
    pub transaction_ref: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Checkout {
    pub fn new(rent_request_id: Uuid, kind: CheckoutKind, reason: Option<String>) -> Self {
        let owner_confirmation = if kind.requires_owner_confirmation() {
            OwnerConfirmation::Pending
        } else {
            OwnerConfirmation::NotRequired
        };
        Self {
            id: Uuid::new_v4(),
            rent_request_id,
            kind,
            status: CheckoutStatus::Pending,
            owner_confirmation,
            reason,
            owner_notes: None,
            deposit_return_percent: None,
            final_refund_amount: None,
            final_payout_amount: None,
            refund_purchase_id: None,
            payout_purchase_id: None,
            transaction_ref: None,
            requested_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Settlement has been recorded; nothing may change afterwards
    pub fn is_settled(&self) -> bool {
        self.status == CheckoutStatus::Completed
    }

    /// Owner rejected and no agent decision has settled it yet
    pub fn is_disputed(&self) -> bool {
        self.owner_confirmation == OwnerConfirmation::Rejected && !self.is_settled()
    }

    /// Still waiting on the owner
    pub fn awaiting_owner(&self) -> bool {
        self.owner_confirmation == OwnerConfirmation::Pending && !self.is_settled()
    }

    /// Eligible for an agent decision
    pub fn awaiting_decision(&self) -> bool {
        matches!(
            self.owner_confirmation,
            OwnerConfirmation::Rejected | OwnerConfirmation::NotRequired
        ) && !self.is_settled()
    }

    /// Whether the owner window has elapsed without action
    pub fn overdue(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.awaiting_owner() && now - self.requested_at >= window
    }

    /// Owner confirms the property is fine; full deposit return, no agent step
    pub fn confirm_by_owner(&mut self, damage_notes: Option<String>) -> DomainResult<()> {
        self.ensure_awaiting_owner("confirm")?;
        self.owner_confirmation = OwnerConfirmation::Confirmed;
        self.status = CheckoutStatus::Confirmed;
        self.owner_notes = damage_notes;
        Ok(())
    }

    /// Owner reports damage; dispute escalates to agent review
    pub fn reject_by_owner(&mut self, damage_notes: String) -> DomainResult<()> {
        if crate::shared::validations::is_blank(&damage_notes) {
            return Err(DomainError::Validation(
                "damage_notes are required when rejecting a checkout".to_string(),
            ));
        }
        self.ensure_awaiting_owner("reject")?;
        self.owner_confirmation = OwnerConfirmation::Rejected;
        self.owner_notes = Some(damage_notes);
        Ok(())
    }

    /// Timeout sweep confirms on the silent owner's behalf
    pub fn auto_confirm(&mut self) -> DomainResult<()> {
        self.ensure_awaiting_owner("auto-confirm")?;
        self.owner_confirmation = OwnerConfirmation::AutoConfirmed;
        self.status = CheckoutStatus::AutoConfirmed;
        Ok(())
    }

    fn ensure_awaiting_owner(&self, action: &str) -> DomainResult<()> {
        if self.owner_confirmation != OwnerConfirmation::Pending {
            return Err(DomainError::AlreadyResolved(format!(
                "cannot {} checkout {}: owner confirmation is '{}'",
                action, self.id, self.owner_confirmation
            )));
        }
        if self.is_settled() {
            return Err(DomainError::AlreadyResolved(format!(
                "checkout {} is already settled",
                self.id
            )));
        }
        Ok(())
    }

    /// Record the settlement outcome. Written exactly once.
    pub fn apply_settlement(
        &mut self,
        breakdown: &SettlementBreakdown,
        refund_purchase_id: Uuid,
        payout_purchase_id: Uuid,
        resolved_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_settled() {
            return Err(DomainError::AlreadyResolved(format!(
                "checkout {} is already settled",
                self.id
            )));
        }
        self.deposit_return_percent = Some(breakdown.deposit_return_percent);
        self.final_refund_amount = Some(breakdown.total_refund());
        self.final_payout_amount = Some(breakdown.total_payout());
        self.refund_purchase_id = Some(refund_purchase_id);
        self.payout_purchase_id = Some(payout_purchase_id);
        self.status = CheckoutStatus::Completed;
        self.resolved_at = Some(resolved_at);
        Ok(())
    }
}

/// One atomic settlement resolution.
///
/// Carries everything the store must persist in a single transaction: the
/// expected owner-confirmation state (the optimistic-concurrency check), the
/// final confirmation value, the computed split, and the decision record when
/// an agent resolved the dispute. Either all of it lands or none of it does.
#[derive(Debug, Clone)]
pub struct SettlementWrite {
    pub checkout_id: Uuid,
    /// Current confirmation state the write is conditional on
    pub expected_confirmation: OwnerConfirmation,
    /// Confirmation state to persist
    pub confirmation: OwnerConfirmation,
    /// Owner notes recorded with the resolution, when present
    pub owner_notes: Option<String>,
    pub breakdown: SettlementBreakdown,
    pub refund_purchase_id: Uuid,
    pub payout_purchase_id: Uuid,
    pub decision: Option<AgentDecision>,
    pub resolved_at: DateTime<Utc>,
}

/// Immutable record of an agent's dispute resolution.
///
/// Never edited in place: a corrected ruling is a new record.
#[derive(Debug, Clone)]
pub struct AgentDecision {
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub decided_by: Uuid,
    pub decided_at: DateTime<Utc>,
    pub deposit_return_percent: Decimal,
    /// Whether the rent itself, not just the deposit, goes back to the renter
    pub rent_returned: bool,
    pub notes: String,
}

impl AgentDecision {
    pub fn new(
        checkout_id: Uuid,
        decided_by: Uuid,
        deposit_return_percent: Decimal,
        rent_returned: bool,
        notes: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            checkout_id,
            decided_by,
            decided_at: Utc::now(),
            deposit_return_percent,
            rent_returned,
            notes,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settlement::calculator::split_deposit;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_checkout() -> Checkout {
        Checkout::new(Uuid::new_v4(), CheckoutKind::Normal, None)
    }

    #[test]
    fn normal_checkout_awaits_owner() {
        let c = sample_checkout();
        assert_eq!(c.status, CheckoutStatus::Pending);
        assert_eq!(c.owner_confirmation, OwnerConfirmation::Pending);
        assert!(c.awaiting_owner());
        assert!(!c.is_settled());
        assert!(!c.awaiting_decision());
    }

    #[test]
    fn early_release_skips_owner_review() {
        let c = Checkout::new(Uuid::new_v4(), CheckoutKind::EarlyRelease, None);
        assert_eq!(c.owner_confirmation, OwnerConfirmation::NotRequired);
        assert!(!c.awaiting_owner());
        // still arbitrable until settled
        assert!(c.awaiting_decision());
    }

    #[test]
    fn owner_confirm_sets_confirmed() {
        let mut c = sample_checkout();
        c.confirm_by_owner(None).unwrap();
        assert_eq!(c.owner_confirmation, OwnerConfirmation::Confirmed);
        assert_eq!(c.status, CheckoutStatus::Confirmed);
    }

    #[test]
    fn owner_reject_requires_notes() {
        let mut c = sample_checkout();
        let err = c.reject_by_owner("   ".to_string()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        // nothing mutated by the failed rejection
        assert_eq!(c.owner_confirmation, OwnerConfirmation::Pending);
        assert!(c.owner_notes.is_none());
    }

    #[test]
    fn owner_reject_escalates_dispute() {
        let mut c = sample_checkout();
        c.reject_by_owner("broken window".to_string()).unwrap();
        assert_eq!(c.owner_confirmation, OwnerConfirmation::Rejected);
        assert!(c.is_disputed());
        assert!(c.awaiting_decision());
        assert_eq!(c.owner_notes.as_deref(), Some("broken window"));
        // status stays pending until the agent settles it
        assert_eq!(c.status, CheckoutStatus::Pending);
    }

    #[test]
    fn second_owner_action_fails() {
        let mut c = sample_checkout();
        c.confirm_by_owner(None).unwrap();
        let err = c.reject_by_owner("too late".to_string()).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyResolved(_)));
        assert_eq!(c.owner_confirmation, OwnerConfirmation::Confirmed);
    }

    #[test]
    fn auto_confirm_only_while_pending() {
        let mut c = sample_checkout();
        c.auto_confirm().unwrap();
        assert_eq!(c.owner_confirmation, OwnerConfirmation::AutoConfirmed);
        assert_eq!(c.status, CheckoutStatus::AutoConfirmed);
        assert!(c.auto_confirm().is_err());
    }

    #[test]
    fn overdue_uses_requested_at() {
        let mut c = sample_checkout();
        c.requested_at = Utc::now() - Duration::hours(73);
        assert!(c.overdue(Utc::now(), Duration::hours(72)));

        c.requested_at = Utc::now() - Duration::hours(71);
        assert!(!c.overdue(Utc::now(), Duration::hours(72)));
    }

    #[test]
    fn resolved_checkout_is_never_overdue() {
        let mut c = sample_checkout();
        c.requested_at = Utc::now() - Duration::hours(100);
        c.confirm_by_owner(None).unwrap();
        assert!(!c.overdue(Utc::now(), Duration::hours(72)));
    }

    #[test]
    fn settlement_is_recorded_once() {
        let mut c = sample_checkout();
        c.confirm_by_owner(None).unwrap();
        let breakdown =
            split_deposit(dec("600.00"), dec("100"), dec("1200.00"), false).unwrap();
        c.apply_settlement(&breakdown, Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert!(c.is_settled());
        assert_eq!(c.final_refund_amount, Some(dec("600.00")));
        assert_eq!(c.final_payout_amount, Some(dec("1200.00")));

        let err = c
            .apply_settlement(&breakdown, Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyResolved(_)));
    }

    #[test]
    fn settled_checkout_is_not_arbitrable() {
        let mut c = sample_checkout();
        c.reject_by_owner("scratched floor".to_string()).unwrap();
        assert!(c.awaiting_decision());
        let breakdown = split_deposit(dec("600.00"), dec("40"), dec("1200.00"), false).unwrap();
        c.apply_settlement(&breakdown, Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert!(!c.awaiting_decision());
    }

    #[test]
    fn kind_roundtrip() {
        for kind in &[CheckoutKind::Normal, CheckoutKind::EarlyRelease] {
            assert_eq!(CheckoutKind::from_str(kind.as_str()), Some(*kind));
        }
        assert!(CheckoutKind::from_str("unknown").is_none());
    }

    #[test]
    fn confirmation_roundtrip() {
        for oc in &[
            OwnerConfirmation::NotRequired,
            OwnerConfirmation::Pending,
            OwnerConfirmation::Confirmed,
            OwnerConfirmation::Rejected,
            OwnerConfirmation::AutoConfirmed,
        ] {
            assert_eq!(&OwnerConfirmation::from_str(oc.as_str()), oc);
        }
    }
}
