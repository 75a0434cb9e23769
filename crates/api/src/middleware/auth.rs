//! Authentication middleware for protected routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::AppState;
use crate::error::error_response;
use atrium_shared::{AppError, JwtError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Validates the Bearer token and stores its [`atrium_shared::Claims`] in
/// the request extensions.
///
/// Only the token is checked here. Whether the user is still active, and
/// what they may do, is decided per request by [`crate::access::Access`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return error_response(&AppError::MissingToken);
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => error_response(&AppError::TokenExpired),
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            error_response(&AppError::InvalidToken)
        }
    }
}
