//! Authentication middleware for Axum
//!
//! Validates bearer tokens issued by the external identity service and
//! attaches the authenticated actor to the request. Authorization itself
//! (who may act on which rental) lives in the domain access guard.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::domain::user::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Authenticated actor extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    fn from_claims(claims: TokenClaims) -> Option<Self> {
        let user_id = Uuid::parse_str(&claims.sub).ok()?;
        let role = UserRole::from_str(&claims.role)?;
        Some(Self {
            user_id,
            display_name: claims.name,
            role,
        })
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Bearer-token authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }
            let Some(user) = AuthenticatedUser::from_claims(claims) else {
                return auth_error_response(AuthError::InvalidToken);
            };
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::create_token;

    #[test]
    fn claims_with_unknown_role_are_rejected() {
        let claims = TokenClaims::new(
            &Uuid::new_v4().to_string(),
            "Eve",
            "superuser",
            &JwtConfig::default(),
        );
        assert!(AuthenticatedUser::from_claims(claims).is_none());
    }

    #[test]
    fn claims_with_malformed_subject_are_rejected() {
        let claims = TokenClaims::new("not-a-uuid", "Eve", "renter", &JwtConfig::default());
        assert!(AuthenticatedUser::from_claims(claims).is_none());
    }

    #[test]
    fn valid_claims_become_an_actor() {
        let id = Uuid::new_v4();
        let cfg = JwtConfig::default();
        let token = create_token(&id.to_string(), "Rita", "renter", &cfg).unwrap();
        let claims = verify_token(&token, &cfg).unwrap();
        let user = AuthenticatedUser::from_claims(claims).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::Renter);
    }
}
