//! Agent console handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::application::services::CheckoutService;
use crate::interfaces::http::common::{domain_error, ApiResponse};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::checkouts::dto::CheckoutDto;

/// Application state for agent console handlers.
#[derive(Clone)]
pub struct AdminAppState {
    pub checkouts: Arc<CheckoutService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/checkouts",
    tag = "Agent Console",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Checkouts awaiting an agent decision, oldest first", body = ApiResponse<Vec<CheckoutDto>>),
        (status = 403, description = "Actor is not a support agent")
    )
)]
pub async fn list_decision_queue(
    State(state): State<AdminAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CheckoutDto>>>, (StatusCode, Json<ApiResponse<Vec<CheckoutDto>>>)>
{
    let checkouts = state
        .checkouts
        .list_awaiting_decision(user.role)
        .await
        .map_err(domain_error)?;

    let dtos: Vec<CheckoutDto> = checkouts.iter().map(CheckoutDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}
