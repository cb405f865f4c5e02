//! Rent request domain entity
//!
//! The agreement record between a renter and a property owner for a date
//! range. Dual-owner aggregate: the renter holds cancellation and payment
//! rights, the property owner holds confirm/reject rights. Who may do what
//! is decided by the access guard, while the methods here guard the state
//! machine itself.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};

/// Rent request status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentRequestStatus {
    /// Awaiting the owner's confirm/reject
    Pending,
    /// Owner confirmed, awaiting payment
    Confirmed,
    /// Payment escrowed, stay in progress
    Paid,
    /// Checkout settled, rental finished
    Completed,
    /// Owner rejected the request
    Rejected,
    /// Renter withdrew after confirmation
    Cancelled,
    /// Owner withdrew after confirmation
    CancelledByOwner,
}

impl RentRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::CancelledByOwner => "cancelled_by_owner",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "paid" => Self::Paid,
            "completed" => Self::Completed,
            "rejected" => Self::Rejected,
            "cancelled_by_owner" => Self::CancelledByOwner,
            _ => Self::Cancelled,
        }
    }

    /// Terminal states are never left
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Rejected | Self::Cancelled | Self::CancelledByOwner
        )
    }
}

impl std::fmt::Display for RentRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rental agreement between a renter and a property owner
#[derive(Debug, Clone)]
pub struct RentRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub renter_id: Uuid,
    /// Denormalized from the property at creation so access predicates
    /// need only the aggregate itself
    pub owner_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: RentRequestStatus,
    /// Rent for the stay, snapshotted from the property at request time
    pub rent_amount: Decimal,
    /// Deposit escrowed at payment, snapshotted at request time
    pub deposit_amount: Decimal,
    /// Currency code (ISO 4217)
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentRequest {
    pub fn new(
        property_id: Uuid,
        renter_id: Uuid,
        owner_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rent_amount: Decimal,
        deposit_amount: Decimal,
        currency: impl Into<String>,
    ) -> DomainResult<Self> {
        if check_out <= check_in {
            return Err(DomainError::Validation(
                "check_out must be after check_in".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            property_id,
            renter_id,
            owner_id,
            check_in,
            check_out,
            status: RentRequestStatus::Pending,
            rent_amount,
            deposit_amount,
            currency: currency.into(),
            created_at: now,
            updated_at: now,
        })
    }

    fn transition(
        &mut self,
        from: RentRequestStatus,
        to: RentRequestStatus,
        action: &'static str,
    ) -> DomainResult<()> {
        if self.status != from {
            return Err(DomainError::InvalidTransition {
                entity: "rent request",
                from: self.status.as_str().to_string(),
                action,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Owner accepts the request
    pub fn confirm(&mut self) -> DomainResult<()> {
        self.transition(RentRequestStatus::Pending, RentRequestStatus::Confirmed, "confirm")
    }

    /// Owner declines the request
    pub fn reject(&mut self) -> DomainResult<()> {
        self.transition(RentRequestStatus::Pending, RentRequestStatus::Rejected, "reject")
    }

    /// Renter withdraws after confirmation
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.transition(RentRequestStatus::Confirmed, RentRequestStatus::Cancelled, "cancel")
    }

    /// Owner withdraws after confirmation. Distinct terminal status so the
    /// audit trail records who terminated the agreement.
    pub fn cancel_by_owner(&mut self) -> DomainResult<()> {
        self.transition(
            RentRequestStatus::Confirmed,
            RentRequestStatus::CancelledByOwner,
            "cancel_confirmed",
        )
    }

    /// Payment escrowed
    pub fn mark_paid(&mut self) -> DomainResult<()> {
        self.transition(RentRequestStatus::Confirmed, RentRequestStatus::Paid, "pay")
    }

    /// System-invoked once the associated checkout settles
    pub fn complete(&mut self) -> DomainResult<()> {
        self.transition(RentRequestStatus::Paid, RentRequestStatus::Completed, "complete")
    }

    /// Total charged at payment: rent plus escrowed deposit
    pub fn total_due(&self) -> Decimal {
        self.rent_amount + self.deposit_amount
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_request() -> RentRequest {
        RentRequest::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            dec("1200.00"),
            dec("600.00"),
            "USD",
        )
        .unwrap()
    }

    #[test]
    fn new_request_is_pending() {
        let r = sample_request();
        assert_eq!(r.status, RentRequestStatus::Pending);
        assert!(!r.status.is_terminal());
        assert_eq!(r.total_due(), dec("1800.00"));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let err = RentRequest::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            dec("1200.00"),
            dec("600.00"),
            "USD",
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn happy_path_to_completed() {
        let mut r = sample_request();
        r.confirm().unwrap();
        assert_eq!(r.status, RentRequestStatus::Confirmed);
        r.mark_paid().unwrap();
        assert_eq!(r.status, RentRequestStatus::Paid);
        r.complete().unwrap();
        assert_eq!(r.status, RentRequestStatus::Completed);
        assert!(r.status.is_terminal());
    }

    #[test]
    fn confirm_only_from_pending() {
        let mut r = sample_request();
        r.confirm().unwrap();
        let err = r.confirm().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition { action: "confirm", .. }
        ));
        // state unchanged by the failed transition
        assert_eq!(r.status, RentRequestStatus::Confirmed);
    }

    #[test]
    fn cancel_only_from_confirmed() {
        let mut r = sample_request();
        assert!(r.cancel().is_err());
        r.confirm().unwrap();
        r.cancel().unwrap();
        assert_eq!(r.status, RentRequestStatus::Cancelled);
    }

    #[test]
    fn owner_cancel_has_distinct_status() {
        let mut r = sample_request();
        r.confirm().unwrap();
        r.cancel_by_owner().unwrap();
        assert_eq!(r.status, RentRequestStatus::CancelledByOwner);
        assert_ne!(
            RentRequestStatus::CancelledByOwner.as_str(),
            RentRequestStatus::Cancelled.as_str()
        );
    }

    #[test]
    fn pay_requires_confirmation() {
        let mut r = sample_request();
        let err = r.mark_paid().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn complete_requires_paid() {
        let mut r = sample_request();
        r.confirm().unwrap();
        assert!(r.complete().is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        let mut r = sample_request();
        r.reject().unwrap();
        assert!(r.confirm().is_err());
        assert!(r.cancel().is_err());
        assert!(r.mark_paid().is_err());
        assert_eq!(r.status, RentRequestStatus::Rejected);
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            RentRequestStatus::Pending,
            RentRequestStatus::Confirmed,
            RentRequestStatus::Paid,
            RentRequestStatus::Completed,
            RentRequestStatus::Rejected,
            RentRequestStatus::Cancelled,
            RentRequestStatus::CancelledByOwner,
        ] {
            let parsed = RentRequestStatus::from_str(status.as_str());
            assert_eq!(&parsed, status);
        }
    }
}
