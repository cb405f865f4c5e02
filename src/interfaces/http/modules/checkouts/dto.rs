//! Checkout DTOs
//!
//! Monetary fields are decimal strings, never floats.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::checkout::Checkout;

/// Checkout details in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutDto {
    pub id: Uuid,
    pub rent_request_id: Uuid,
    /// normal or early_release
    pub kind: String,
    /// pending, confirmed, auto_confirmed or completed
    pub status: String,
    /// not_required, pending, confirmed, rejected or auto_confirmed
    pub owner_confirmation: String,
    pub reason: Option<String>,
    pub owner_notes: Option<String>,
    /// Decimal string in [0,100]; null until resolved
    pub deposit_return_percent: Option<String>,
    /// Decimal string; null until resolved
    pub final_refund_amount: Option<String>,
    /// Decimal string; null until resolved
    pub final_payout_amount: Option<String>,
    pub refund_purchase_id: Option<Uuid>,
    pub payout_purchase_id: Option<Uuid>,
    pub transaction_ref: Option<String>,
    pub requested_at: String,
    pub resolved_at: Option<String>,
}

impl From<&Checkout> for CheckoutDto {
    fn from(c: &Checkout) -> Self {
        Self {
            id: c.id,
            rent_request_id: c.rent_request_id,
            kind: c.kind.as_str().to_string(),
            status: c.status.as_str().to_string(),
            owner_confirmation: c.owner_confirmation.as_str().to_string(),
            reason: c.reason.clone(),
            owner_notes: c.owner_notes.clone(),
            deposit_return_percent: c.deposit_return_percent.map(|d| d.to_string()),
            final_refund_amount: c.final_refund_amount.map(|d| d.to_string()),
            final_payout_amount: c.final_payout_amount.map(|d| d.to_string()),
            refund_purchase_id: c.refund_purchase_id,
            payout_purchase_id: c.payout_purchase_id,
            transaction_ref: c.transaction_ref.clone(),
            requested_at: c.requested_at.to_rfc3339(),
            resolved_at: c.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Owner confirms the checkout; notes are optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OwnerConfirmRequest {
    #[validate(length(max = 1000, message = "damage_notes must be at most 1000 characters"))]
    pub damage_notes: Option<String>,
}

/// Owner rejects the checkout; damage notes are mandatory
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OwnerRejectRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "damage_notes are required when rejecting"
    ))]
    pub damage_notes: String,
}

/// Agent resolves a disputed checkout
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AgentDecisionRequest {
    /// Share of the deposit returned to the renter, 0-100
    #[schema(value_type = String)]
    pub deposit_return_percent: Decimal,
    /// Whether the rent itself goes back to the renter
    pub rent_returned: bool,
    #[validate(length(min = 1, max = 2000, message = "notes are required"))]
    pub notes: String,
}
