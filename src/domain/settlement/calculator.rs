//! Settlement arithmetic
//!
//! Pure functions turning the escrowed deposit, the agreed return percent
//! and the rent-return flag into the exact amounts moved to each party.
//! All arithmetic is fixed-point `Decimal`; the deposit split conserves the
//! escrowed total to the minor unit, with any rounding remainder landing on
//! the payout side.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::domain::error::DomainError;

/// Currency minor-unit scale (two decimal places)
const MINOR_UNIT_SCALE: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error("deposit_return_percent must be between 0 and 100, got {0}")]
    InvalidPercent(Decimal),

    #[error("total deposit is unset or negative")]
    MissingDeposit,

    #[error("rent amount is negative")]
    MissingRent,
}

impl From<SettlementError> for DomainError {
    fn from(e: SettlementError) -> Self {
        DomainError::Validation(e.to_string())
    }
}

/// Exact settlement amounts for one resolved checkout
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementBreakdown {
    pub deposit_return_percent: Decimal,
    /// Deposit share returned to the renter
    pub deposit_refund: Decimal,
    /// Deposit share released to the owner
    pub deposit_payout: Decimal,
    /// Rent returned to the renter (all or nothing)
    pub rent_refund: Decimal,
    /// Rent released to the owner
    pub rent_payout: Decimal,
}

impl SettlementBreakdown {
    /// Everything the renter receives back
    pub fn total_refund(&self) -> Decimal {
        self.deposit_refund + self.rent_refund
    }

    /// Everything the owner receives
    pub fn total_payout(&self) -> Decimal {
        self.deposit_payout + self.rent_payout
    }
}

/// Split the escrowed deposit between renter and owner.
///
/// The refund is `total_deposit * percent / 100` rounded half-up to the
/// minor unit; the payout is the exact complement, so
/// `deposit_refund + deposit_payout == total_deposit` always holds. The
/// rent moves whole: back to the renter when `rent_returned`, to the owner
/// otherwise.
pub fn split_deposit(
    total_deposit: Decimal,
    deposit_return_percent: Decimal,
    rent_amount: Decimal,
    rent_returned: bool,
) -> Result<SettlementBreakdown, SettlementError> {
    if total_deposit.is_sign_negative() {
        return Err(SettlementError::MissingDeposit);
    }
    if rent_amount.is_sign_negative() {
        return Err(SettlementError::MissingRent);
    }
    if deposit_return_percent < Decimal::ZERO || deposit_return_percent > Decimal::ONE_HUNDRED {
        return Err(SettlementError::InvalidPercent(deposit_return_percent));
    }

    let raw_refund = total_deposit * deposit_return_percent / Decimal::ONE_HUNDRED;
    let deposit_refund = raw_refund
        .round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
        // rounding up at 100% of a sub-minor-unit deposit must not exceed the escrow
        .min(total_deposit);
    let deposit_payout = total_deposit - deposit_refund;

    let (rent_refund, rent_payout) = if rent_returned {
        (rent_amount, Decimal::ZERO)
    } else {
        (Decimal::ZERO, rent_amount)
    };

    Ok(SettlementBreakdown {
        deposit_return_percent,
        deposit_refund,
        deposit_payout,
        rent_refund,
        rent_payout,
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn full_return() {
        let b = split_deposit(dec("600.00"), dec("100"), dec("1200.00"), false).unwrap();
        assert_eq!(b.deposit_refund, dec("600.00"));
        assert_eq!(b.deposit_payout, dec("0.00"));
        assert_eq!(b.total_payout(), dec("1200.00"));
        assert_eq!(b.total_refund(), dec("600.00"));
    }

    #[test]
    fn zero_return() {
        let b = split_deposit(dec("600.00"), dec("0"), dec("1200.00"), false).unwrap();
        assert_eq!(b.deposit_refund, dec("0.00"));
        assert_eq!(b.deposit_payout, dec("600.00"));
    }

    #[test]
    fn partial_return_forty_percent() {
        // scenario: agent keeps 60% for damage, rent stays with the owner
        let b = split_deposit(dec("600.00"), dec("40"), dec("1200.00"), false).unwrap();
        assert_eq!(b.deposit_refund, dec("240.00"));
        assert_eq!(b.deposit_payout, dec("360.00"));
        assert_eq!(b.total_payout(), dec("1560.00"));
    }

    #[test]
    fn rent_returned_goes_to_renter() {
        let b = split_deposit(dec("600.00"), dec("50"), dec("1200.00"), true).unwrap();
        assert_eq!(b.rent_refund, dec("1200.00"));
        assert_eq!(b.rent_payout, dec("0"));
        assert_eq!(b.total_refund(), dec("1500.00"));
        assert_eq!(b.total_payout(), dec("300.00"));
    }

    #[test]
    fn rounds_half_up() {
        // 33% of 100.01 = 33.0033 -> 33.00; 33.5% of 100 = 33.50 stays
        let b = split_deposit(dec("100.01"), dec("33"), dec("0"), false).unwrap();
        assert_eq!(b.deposit_refund, dec("33.00"));
        assert_eq!(b.deposit_payout, dec("67.01"));

        // midpoint rounds away from zero: 12.345 -> 12.35
        let b = split_deposit(dec("24.69"), dec("50"), dec("0"), false).unwrap();
        assert_eq!(b.deposit_refund, dec("12.35"));
        assert_eq!(b.deposit_payout, dec("12.34"));
    }

    #[test]
    fn conservation_holds_for_awkward_percents() {
        let deposits = ["600.00", "0.01", "999.99", "123.45", "0.00", "1000000.01"];
        let percents = [
            "0", "1", "3", "7.5", "33", "33.33", "40", "50", "66.67", "99", "99.99", "100",
        ];
        for d in deposits {
            for p in percents {
                let deposit = dec(d);
                let b = split_deposit(deposit, dec(p), dec("0"), false).unwrap();
                assert_eq!(
                    b.deposit_refund + b.deposit_payout,
                    deposit,
                    "conservation violated for deposit={} percent={}",
                    d,
                    p
                );
                assert!(b.deposit_refund >= Decimal::ZERO);
                assert!(b.deposit_payout >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn hundred_percent_of_sub_minor_deposit_does_not_overdraw() {
        // 100% of 0.005 rounds to 0.01 before clamping; the escrow only
        // holds 0.005, so the refund is clamped and conservation holds
        let deposit = dec("0.005");
        let b = split_deposit(deposit, dec("100"), dec("0"), false).unwrap();
        assert_eq!(b.deposit_refund, deposit);
        assert_eq!(b.deposit_payout, Decimal::ZERO);
    }

    #[test]
    fn invalid_percent_rejected() {
        assert_eq!(
            split_deposit(dec("600.00"), dec("-1"), dec("0"), false),
            Err(SettlementError::InvalidPercent(dec("-1")))
        );
        assert_eq!(
            split_deposit(dec("600.00"), dec("100.01"), dec("0"), false),
            Err(SettlementError::InvalidPercent(dec("100.01")))
        );
    }

    #[test]
    fn negative_deposit_rejected() {
        assert_eq!(
            split_deposit(dec("-0.01"), dec("50"), dec("0"), false),
            Err(SettlementError::MissingDeposit)
        );
    }

    #[test]
    fn negative_rent_rejected() {
        assert_eq!(
            split_deposit(dec("600.00"), dec("50"), dec("-1"), false),
            Err(SettlementError::MissingRent)
        );
    }

    #[test]
    fn zero_deposit_is_fine() {
        let b = split_deposit(dec("0"), dec("50"), dec("1200.00"), false).unwrap();
        assert_eq!(b.deposit_refund, Decimal::ZERO);
        assert_eq!(b.deposit_payout, Decimal::ZERO);
        assert_eq!(b.total_payout(), dec("1200.00"));
    }
}
