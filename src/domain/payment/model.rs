//! Payment record domain entity
//!
//! The idempotency ledger for `pay`. One row per successful charge; the
//! client-supplied key is unique per rent request, so a retried call finds
//! the original row and returns it verbatim instead of charging twice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Escrow payment for a rent request
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub rent_request_id: Uuid,
    /// Client-supplied token making retries safe
    pub idempotency_key: String,
    /// Rent plus deposit, escrowed together
    pub amount: Decimal,
    /// Currency code (ISO 4217)
    pub currency: String,
    /// Reference passed to / received from the external gateway
    pub transaction_ref: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(
        rent_request_id: Uuid,
        idempotency_key: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            rent_request_id,
            idempotency_key: idempotency_key.into(),
            amount,
            currency: currency.into(),
            transaction_ref: format!("PAY-{}", id.simple()),
            created_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_ref_derives_from_id() {
        let p = PaymentRecord::new(Uuid::new_v4(), "key-1", "1800.00".parse().unwrap(), "USD");
        assert_eq!(p.transaction_ref, format!("PAY-{}", p.id.simple()));
        assert_eq!(p.idempotency_key, "key-1");
    }
}
