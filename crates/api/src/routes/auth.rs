//! Authentication routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::info;

use crate::AppState;
use crate::error::error_response;
use atrium_core::auth::verify_or_dummy;
use atrium_db::UserRepository;
use atrium_shared::AppError;
use atrium_shared::auth::{LoginRequest, LoginResponse, UserInfo};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login - Authenticate user and return an access token.
///
/// Unknown emails, wrong passwords and disabled accounts all answer with the
/// same 401, after the same amount of hashing work.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(user) => user,
        Err(e) => {
            return error_response(&AppError::Internal(format!("user lookup failed: {e}")));
        }
    };

    let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
    match verify_or_dummy(&payload.password, stored_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(email = %payload.email, "Failed login attempt");
            return error_response(&AppError::InvalidCredentials);
        }
        Err(e) => {
            return error_response(&AppError::Internal(format!(
                "password verification failed: {e}"
            )));
        }
    }

    let Some(user) = user.filter(|u| u.is_active) else {
        info!(email = %payload.email, "Login attempt for disabled account");
        return error_response(&AppError::InvalidCredentials);
    };

    let roles: Vec<String> = user.role_set().into_iter().collect();
    let access_token =
        match state
            .jwt_service
            .generate_access_token(user.id, &user.email, roles.clone())
        {
            Ok(token) => token,
            Err(e) => {
                return error_response(&AppError::Internal(format!(
                    "token generation failed: {e}"
                )));
            }
        };

    info!(user_id = %user.id, "User logged in");

    (
        StatusCode::OK,
        Json(LoginResponse {
            user: UserInfo {
                id: user.id,
                email: user.email,
                full_name: user.full_name,
                roles,
            },
            access_token,
            token_type: "Bearer",
            expires_in: state.jwt_service.access_token_expires_in(),
        }),
    )
        .into_response()
}
