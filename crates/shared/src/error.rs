//! Request-level error types.
//!
//! `AppError` covers failures that belong to no domain: bearer tokens, login,
//! and malformed query input. Domain errors (`AuthzError`, `WorkflowError`,
//! repository errors) carry their own status and code.

use thiserror::Error;

/// Request-level failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// No bearer token on a protected route.
    #[error("Authorization header with Bearer token is required")]
    MissingToken,

    /// The token's `exp` has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// Bad signature or malformed token.
    #[error("Invalid or malformed token")]
    InvalidToken,

    /// Unknown email, wrong password, or disabled account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidCredentials => 401,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
