//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::services::{CheckoutService, RentRequestService};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{admin, checkouts, health, rent_requests};

/// Unified state for all rent workflow routes.
/// Axum extracts the specific handler state via `FromRef`.
#[derive(Clone)]
pub struct RentUnifiedState {
    pub rent_requests: Arc<RentRequestService>,
    pub checkouts: Arc<CheckoutService>,
    pub auth: AuthState,
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<RentUnifiedState> for rent_requests::RentRequestAppState {
    fn from_ref(s: &RentUnifiedState) -> Self {
        rent_requests::RentRequestAppState {
            rent_requests: Arc::clone(&s.rent_requests),
            checkouts: Arc::clone(&s.checkouts),
        }
    }
}

impl FromRef<RentUnifiedState> for checkouts::CheckoutAppState {
    fn from_ref(s: &RentUnifiedState) -> Self {
        checkouts::CheckoutAppState {
            checkouts: Arc::clone(&s.checkouts),
        }
    }
}

impl FromRef<RentUnifiedState> for admin::AdminAppState {
    fn from_ref(s: &RentUnifiedState) -> Self {
        admin::AdminAppState {
            checkouts: Arc::clone(&s.checkouts),
        }
    }
}

impl FromRef<RentUnifiedState> for AuthState {
    fn from_ref(s: &RentUnifiedState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT bearer token from the identity service"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Rent requests
        rent_requests::handlers::list_rent_requests,
        rent_requests::handlers::create_rent_request,
        rent_requests::handlers::get_rent_request,
        rent_requests::handlers::confirm_rent_request,
        rent_requests::handlers::reject_rent_request,
        rent_requests::handlers::cancel_rent_request,
        rent_requests::handlers::cancel_confirmed_rent_request,
        rent_requests::handlers::pay_rent_request,
        rent_requests::handlers::request_checkout,
        rent_requests::handlers::checkout_status,
        // Checkouts
        checkouts::handlers::owner_confirm,
        checkouts::handlers::owner_reject,
        checkouts::handlers::agent_decision,
        // Agent console
        admin::handlers::list_decision_queue,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginatedResponse<rent_requests::dto::RentRequestDetailsDto>,
            // Health
            health::handlers::HealthStatus,
            // Rent requests
            rent_requests::dto::CreateRentRequestRequest,
            rent_requests::dto::RentRequestDto,
            rent_requests::dto::RentRequestDetailsDto,
            rent_requests::dto::PropertySummaryDto,
            rent_requests::dto::UserSummaryDto,
            rent_requests::dto::PayRequest,
            rent_requests::dto::PaymentDto,
            rent_requests::dto::RequestCheckoutRequest,
            rent_requests::dto::AllowedActionsDto,
            rent_requests::dto::CheckoutStatusDto,
            // Checkouts
            checkouts::dto::CheckoutDto,
            checkouts::dto::OwnerConfirmRequest,
            checkouts::dto::OwnerRejectRequest,
            checkouts::dto::AgentDecisionRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Rent Requests", description = "Rent lifecycle: request, confirm/reject, cancel, pay, checkout"),
        (name = "Checkouts", description = "Checkout resolution: owner confirmation, rejection, agent decisions"),
        (name = "Agent Console", description = "Support-agent queue of checkouts awaiting a decision"),
    ),
    info(
        title = "Stayvia Rent Lifecycle API",
        version = "1.0.0",
        description = "REST API for the rent lifecycle and checkout settlement workflow",
        license(name = "MIT"),
        contact(name = "Stayvia", email = "support@stayvia.io")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    rent_request_service: Arc<RentRequestService>,
    checkout_service: Arc<CheckoutService>,
    jwt_config: JwtConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let auth_state = AuthState { jwt_config };

    let unified = RentUnifiedState {
        rent_requests: rent_request_service,
        checkouts: checkout_service,
        auth: auth_state.clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rent request routes (protected)
    let rent_request_routes = Router::new()
        .route(
            "/",
            get(rent_requests::handlers::list_rent_requests)
                .post(rent_requests::handlers::create_rent_request),
        )
        .route("/{id}", get(rent_requests::handlers::get_rent_request))
        .route(
            "/{id}/confirm",
            post(rent_requests::handlers::confirm_rent_request),
        )
        .route(
            "/{id}/reject",
            post(rent_requests::handlers::reject_rent_request),
        )
        .route(
            "/{id}/cancel",
            post(rent_requests::handlers::cancel_rent_request),
        )
        .route(
            "/{id}/cancel-confirmed",
            post(rent_requests::handlers::cancel_confirmed_rent_request),
        )
        .route("/{id}/pay", post(rent_requests::handlers::pay_rent_request))
        .route(
            "/{id}/checkout",
            post(rent_requests::handlers::request_checkout),
        )
        .route(
            "/{id}/checkout-status",
            get(rent_requests::handlers::checkout_status),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(unified.clone());

    // Checkout routes (protected)
    let checkout_routes = Router::new()
        .route(
            "/{checkout_id}/owner-confirm",
            post(checkouts::handlers::owner_confirm),
        )
        .route(
            "/{checkout_id}/owner-reject",
            post(checkouts::handlers::owner_reject),
        )
        .route(
            "/{checkout_id}/agent-decision",
            post(checkouts::handlers::agent_decision),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(unified.clone());

    // Agent console routes (protected; role enforced by the service)
    let admin_routes = Router::new()
        .route("/checkouts", get(admin::handlers::list_decision_queue))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(unified);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::handlers::health_check))
        // Prometheus metrics
        .route(
            "/metrics",
            get(move || async move { prometheus_handle.render() }),
        )
        // Rent workflow
        .nest("/api/v1/rent-requests", rent_request_routes)
        .nest("/api/v1/checkouts", checkout_routes)
        .nest("/api/v1/admin", admin_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
