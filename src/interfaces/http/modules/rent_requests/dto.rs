//! Rent request DTOs
//!
//! Dates cross the wire as ISO 8601 strings, monetary fields as decimal
//! strings.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::services::rent_request::{PaymentOutcome, RentRequestDetails};
use crate::domain::access::AllowedActions;
use crate::domain::property::Property;
use crate::domain::rent_request::RentRequest;
use crate::domain::user::User;
use crate::interfaces::http::modules::checkouts::dto::CheckoutDto;

/// Request to open a new rent request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRentRequestRequest {
    pub property_id: Uuid,
    /// Check-in date (ISO 8601, YYYY-MM-DD)
    pub check_in: String,
    /// Check-out date (ISO 8601, YYYY-MM-DD)
    pub check_out: String,
}

/// Rent request details in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct RentRequestDto {
    pub id: Uuid,
    pub property_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub check_in: String,
    pub check_out: String,
    /// pending, confirmed, paid, completed, rejected, cancelled or
    /// cancelled_by_owner
    pub status: String,
    /// Decimal string, minor-unit exact
    pub rent_amount: String,
    /// Decimal string, minor-unit exact
    pub deposit_amount: String,
    pub currency: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&RentRequest> for RentRequestDto {
    fn from(r: &RentRequest) -> Self {
        Self {
            id: r.id,
            property_id: r.property_id,
            renter_id: r.renter_id,
            owner_id: r.owner_id,
            check_in: r.check_in.to_string(),
            check_out: r.check_out.to_string(),
            status: r.status.as_str().to_string(),
            rent_amount: r.rent_amount.to_string(),
            deposit_amount: r.deposit_amount.to_string(),
            currency: r.currency.clone(),
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Embedded property summary
#[derive(Debug, Serialize, ToSchema)]
pub struct PropertySummaryDto {
    pub id: Uuid,
    pub title: String,
    pub address: String,
    pub rent_amount: String,
    pub deposit_amount: String,
    pub currency: String,
}

impl From<&Property> for PropertySummaryDto {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            address: p.address.clone(),
            rent_amount: p.rent_amount.to_string(),
            deposit_amount: p.deposit_amount.to_string(),
            currency: p.currency.clone(),
        }
    }
}

/// Embedded renter summary
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
}

impl From<&User> for UserSummaryDto {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            display_name: u.display_name.clone(),
            email: u.email.clone(),
        }
    }
}

/// Rent request with embedded property and renter summaries
#[derive(Debug, Serialize, ToSchema)]
pub struct RentRequestDetailsDto {
    #[serde(flatten)]
    pub request: RentRequestDto,
    pub property: Option<PropertySummaryDto>,
    pub user_info: Option<UserSummaryDto>,
}

impl From<&RentRequestDetails> for RentRequestDetailsDto {
    fn from(d: &RentRequestDetails) -> Self {
        Self {
            request: RentRequestDto::from(&d.request),
            property: d.property.as_ref().map(PropertySummaryDto::from),
            user_info: d.renter.as_ref().map(UserSummaryDto::from),
        }
    }
}

/// Query parameters for the rent request list
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRentRequestsQuery {
    /// Which side of the agreement to list: "renter" (default) or "owner"
    pub role: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Payment request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PayRequest {
    /// Client-supplied token making retries safe
    #[validate(length(min = 1, max = 100, message = "idempotency_key is required"))]
    pub idempotency_key: String,
}

/// Payment result
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentDto {
    pub id: Uuid,
    pub rent_request_id: Uuid,
    /// Decimal string: rent plus deposit
    pub amount: String,
    pub currency: String,
    pub transaction_ref: String,
    /// External gateway redirect, when configured
    pub redirect_url: Option<String>,
    pub created_at: String,
}

impl From<&PaymentOutcome> for PaymentDto {
    fn from(o: &PaymentOutcome) -> Self {
        Self {
            id: o.record.id,
            rent_request_id: o.record.rent_request_id,
            amount: o.record.amount.to_string(),
            currency: o.record.currency.clone(),
            transaction_ref: o.record.transaction_ref.clone(),
            redirect_url: o.redirect_url.clone(),
            created_at: o.record.created_at.to_rfc3339(),
        }
    }
}

/// Request to check out of a paid rental
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestCheckoutRequest {
    /// "normal" (default) or "early_release"
    pub kind: Option<String>,
    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Per-actor action flags mirrored from the access guard
#[derive(Debug, Serialize, ToSchema)]
pub struct AllowedActionsDto {
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

impl From<&AllowedActions> for AllowedActionsDto {
    fn from(a: &AllowedActions) -> Self {
        Self {
            can_confirm: a.can_confirm,
            can_reject: a.can_reject,
            can_cancel: a.can_cancel,
            can_cancel_confirmed: a.can_cancel_confirmed,
            can_pay: a.can_pay,
            can_request_checkout: a.can_request_checkout,
            can_owner_confirm: a.can_owner_confirm,
            can_owner_reject: a.can_owner_reject,
            can_agent_decide: a.can_agent_decide,
        }
    }
}

/// Current checkout state for one rental
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutStatusDto {
    pub rent_request: RentRequestDto,
    pub checkout: Option<CheckoutDto>,
    /// Human-readable summary of where the checkout stands
    pub message: String,
    pub actions: AllowedActionsDto,
}
