//! Checkout HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::application::services::CheckoutService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

use super::dto::*;

/// Application state for checkout handlers.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub checkouts: Arc<CheckoutService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/checkouts/{checkout_id}/owner-confirm",
    tag = "Checkouts",
    security(("bearer_auth" = [])),
    params(("checkout_id" = Uuid, Path, description = "Checkout ID")),
    request_body = OwnerConfirmRequest,
    responses(
        (status = 200, description = "Checkout settled with full deposit return", body = ApiResponse<CheckoutDto>),
        (status = 403, description = "Actor is not the property owner"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Checkout already resolved")
    )
)]
pub async fn owner_confirm(
    State(state): State<CheckoutAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(checkout_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<OwnerConfirmRequest>,
) -> Result<Json<ApiResponse<CheckoutDto>>, (StatusCode, Json<ApiResponse<CheckoutDto>>)> {
    let checkout = state
        .checkouts
        .owner_confirm(checkout_id, user.user_id, user.role, body.damage_notes)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutDto::from(&checkout))))
}

#[utoipa::path(
    post,
    path = "/api/v1/checkouts/{checkout_id}/owner-reject",
    tag = "Checkouts",
    security(("bearer_auth" = [])),
    params(("checkout_id" = Uuid, Path, description = "Checkout ID")),
    request_body = OwnerRejectRequest,
    responses(
        (status = 200, description = "Dispute escalated to agent review", body = ApiResponse<CheckoutDto>),
        (status = 403, description = "Actor is not the property owner"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Checkout already resolved"),
        (status = 422, description = "Missing damage notes")
    )
)]
pub async fn owner_reject(
    State(state): State<CheckoutAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(checkout_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<OwnerRejectRequest>,
) -> Result<Json<ApiResponse<CheckoutDto>>, (StatusCode, Json<ApiResponse<CheckoutDto>>)> {
    let checkout = state
        .checkouts
        .owner_reject(checkout_id, user.user_id, user.role, body.damage_notes)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutDto::from(&checkout))))
}

#[utoipa::path(
    post,
    path = "/api/v1/checkouts/{checkout_id}/agent-decision",
    tag = "Checkouts",
    security(("bearer_auth" = [])),
    params(("checkout_id" = Uuid, Path, description = "Checkout ID")),
    request_body = AgentDecisionRequest,
    responses(
        (status = 200, description = "Checkout settled per the decision", body = ApiResponse<CheckoutDto>),
        (status = 403, description = "Actor is not a support agent"),
        (status = 404, description = "Checkout not found"),
        (status = 409, description = "Checkout not eligible for a decision"),
        (status = 422, description = "Invalid percent or missing notes")
    )
)]
pub async fn agent_decision(
    State(state): State<CheckoutAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(checkout_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AgentDecisionRequest>,
) -> Result<Json<ApiResponse<CheckoutDto>>, (StatusCode, Json<ApiResponse<CheckoutDto>>)> {
    let checkout = state
        .checkouts
        .agent_decide(
            checkout_id,
            user.user_id,
            user.role,
            body.deposit_return_percent,
            body.rent_returned,
            body.notes,
        )
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(CheckoutDto::from(&checkout))))
}
