//! Rent request HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::services::{CheckoutService, RentRequestService};
use crate::domain::checkout::CheckoutKind;
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    domain_error, ApiResponse, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::checkouts::dto::CheckoutDto;
use crate::shared::validations::validate_pagination;

use super::dto::*;

/// Application state for rent request handlers.
#[derive(Clone)]
pub struct RentRequestAppState {
    pub rent_requests: Arc<RentRequestService>,
    pub checkouts: Arc<CheckoutService>,
}

fn parse_date<T>(
    value: &str,
    field: &str,
) -> Result<NaiveDate, (StatusCode, Json<ApiResponse<T>>)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Invalid {}: {}", field, e))),
        )
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/rent-requests",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(ListRentRequestsQuery),
    responses(
        (status = 200, description = "The caller's rent requests", body = ApiResponse<PaginatedResponse<RentRequestDetailsDto>>),
        (status = 400, description = "Invalid role parameter")
    )
)]
pub async fn list_rent_requests(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListRentRequestsQuery>,
) -> Result<
    Json<ApiResponse<PaginatedResponse<RentRequestDetailsDto>>>,
    (StatusCode, Json<ApiResponse<PaginatedResponse<RentRequestDetailsDto>>>),
> {
    let as_owner = match query.role.as_deref() {
        None | Some("renter") => false,
        Some("owner") => true,
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "Invalid role '{}': expected 'renter' or 'owner'",
                    other
                ))),
            ));
        }
    };
    let (page, limit) = validate_pagination(query.page, query.limit);

    let result = state
        .rent_requests
        .list(user.user_id, as_owner, page, limit)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.items.iter().map(RentRequestDetailsDto::from).collect(),
        total: result.total,
        page: result.page,
        limit: result.limit,
        total_pages: result.total_pages,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    request_body = CreateRentRequestRequest,
    responses(
        (status = 200, description = "Rent request created", body = ApiResponse<RentRequestDto>),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Property not found"),
        (status = 422, description = "Invalid date range or unavailable property")
    )
)]
pub async fn create_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateRentRequestRequest>,
) -> Result<Json<ApiResponse<RentRequestDto>>, (StatusCode, Json<ApiResponse<RentRequestDto>>)> {
    let check_in = parse_date(&body.check_in, "check_in")?;
    let check_out = parse_date(&body.check_out, "check_out")?;

    let request = state
        .rent_requests
        .create(user.user_id, body.property_id, check_in, check_out)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(RentRequestDto::from(&request))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rent-requests/{id}",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Rent request details", body = ApiResponse<RentRequestDetailsDto>),
        (status = 403, description = "Not a party to this rental"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<
    Json<ApiResponse<RentRequestDetailsDto>>,
    (StatusCode, Json<ApiResponse<RentRequestDetailsDto>>),
> {
    let details = state
        .rent_requests
        .get(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(RentRequestDetailsDto::from(&details))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/confirm",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Request confirmed", body = ApiResponse<RentRequestDto>),
        (status = 403, description = "Actor is not the property owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not in pending state")
    )
)]
pub async fn confirm_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentRequestDto>>, (StatusCode, Json<ApiResponse<RentRequestDto>>)> {
    let request = state
        .rent_requests
        .confirm(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(RentRequestDto::from(&request))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/reject",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Request rejected", body = ApiResponse<RentRequestDto>),
        (status = 403, description = "Actor is not the property owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not in pending state")
    )
)]
pub async fn reject_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentRequestDto>>, (StatusCode, Json<ApiResponse<RentRequestDto>>)> {
    let request = state
        .rent_requests
        .reject(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(RentRequestDto::from(&request))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/cancel",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Request cancelled by the renter", body = ApiResponse<RentRequestDto>),
        (status = 403, description = "Actor is not the renter"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not in confirmed state")
    )
)]
pub async fn cancel_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentRequestDto>>, (StatusCode, Json<ApiResponse<RentRequestDto>>)> {
    let request = state
        .rent_requests
        .cancel(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(RentRequestDto::from(&request))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/cancel-confirmed",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Request withdrawn by the owner", body = ApiResponse<RentRequestDto>),
        (status = 403, description = "Actor is not the property owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not in confirmed state")
    )
)]
pub async fn cancel_confirmed_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentRequestDto>>, (StatusCode, Json<ApiResponse<RentRequestDto>>)> {
    let request = state
        .rent_requests
        .cancel_confirmed(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(RentRequestDto::from(&request))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/pay",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    request_body = PayRequest,
    responses(
        (status = 200, description = "Payment result; repeated keys return the original charge", body = ApiResponse<PaymentDto>),
        (status = 403, description = "Actor is not the renter"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not in confirmed state"),
        (status = 422, description = "Missing idempotency key")
    )
)]
pub async fn pay_rent_request(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<PayRequest>,
) -> Result<Json<ApiResponse<PaymentDto>>, (StatusCode, Json<ApiResponse<PaymentDto>>)> {
    let outcome = state
        .rent_requests
        .pay(id, user.user_id, user.role, &body.idempotency_key)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaymentDto::from(&outcome))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rent-requests/{id}/checkout",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    request_body = RequestCheckoutRequest,
    responses(
        (status = 200, description = "Checkout created (settled immediately for early_release)", body = ApiResponse<CheckoutDto>),
        (status = 403, description = "Actor is not the renter"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Rental not paid or checkout already exists"),
        (status = 422, description = "Unknown kind or overlong reason")
    )
)]
pub async fn request_checkout(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<RequestCheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutDto>>, (StatusCode, Json<ApiResponse<CheckoutDto>>)> {
    let kind = match body.kind.as_deref() {
        None => CheckoutKind::Normal,
        Some(value) => CheckoutKind::from_str(value).ok_or_else(|| {
            domain_error(DomainError::Validation(format!(
                "unknown checkout kind '{}'",
                value
            )))
        })?,
    };

    let reason = body.reason.filter(|r| !r.trim().is_empty());
    let checkout = state
        .checkouts
        .request_checkout(id, user.user_id, user.role, kind, reason)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutDto::from(&checkout))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rent-requests/{id}/checkout-status",
    tag = "Rent Requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rent request ID")),
    responses(
        (status = 200, description = "Current checkout state for the calling actor", body = ApiResponse<CheckoutStatusDto>),
        (status = 403, description = "Not a party to this rental"),
        (status = 404, description = "Not found")
    )
)]
pub async fn checkout_status(
    State(state): State<RentRequestAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CheckoutStatusDto>>, (StatusCode, Json<ApiResponse<CheckoutStatusDto>>)>
{
    let view = state
        .checkouts
        .checkout_status(id, user.user_id, user.role)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutStatusDto {
        rent_request: RentRequestDto::from(&view.rent_request),
        checkout: view.checkout.as_ref().map(CheckoutDto::from),
        message: view.message,
        actions: AllowedActionsDto::from(&view.actions),
    })))
}
