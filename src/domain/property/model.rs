//! Property domain entity
//!
//! Properties are created and moderated by the admin surface; the rent
//! workflow reads them to resolve the owner and to snapshot financial terms
//! onto new rent requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Rentable property listing
#[derive(Debug, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: String,
    /// Monthly rent in the listing currency
    pub rent_amount: Decimal,
    /// Security deposit held in escrow for the stay
    pub deposit_amount: Decimal,
    /// Currency code (ISO 4217)
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(
        owner_id: Uuid,
        title: impl Into<String>,
        address: impl Into<String>,
        rent_amount: Decimal,
        deposit_amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            address: address.into(),
            rent_amount,
            deposit_amount,
            currency: currency.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
