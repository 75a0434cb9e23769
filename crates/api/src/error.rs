//! Errors rendered as JSON responses.
//!
//! Every error type the handlers see already knows its status and code; this
//! module only gives them one body shape: `{"error": CODE, "message": ...}`.
//! Codes are SCREAMING_SNAKE_CASE throughout.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::error;

use atrium_core::authz::AuthzError;
use atrium_core::workflow::WorkflowError;
use atrium_db::repositories::{GroupError, PermissionError, TransactionError};
use atrium_shared::AppError;

/// An error that maps onto an HTTP status and a stable error code.
pub trait HttpError: std::fmt::Display {
    /// HTTP status code.
    fn status(&self) -> u16;
    /// Machine-readable error code.
    fn code(&self) -> &'static str;
}

macro_rules! http_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HttpError for $ty {
                fn status(&self) -> u16 {
                    self.status_code()
                }

                fn code(&self) -> &'static str {
                    self.error_code()
                }
            }
        )*
    };
}

http_error!(
    AppError,
    AuthzError,
    WorkflowError,
    GroupError,
    PermissionError,
    TransactionError,
);

/// The JSON body for an error. 5xx messages are replaced with a generic one.
pub fn error_body<E: HttpError>(err: &E) -> Value {
    let message = if err.status() >= 500 {
        "An internal error occurred".to_string()
    } else {
        err.to_string()
    };
    json!({
        "error": err.code(),
        "message": message,
    })
}

/// Renders an error, logging server-side failures.
pub fn error_response<E: HttpError>(err: &E) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, code = err.code(), "Request failed");
    }
    (status, Json(error_body(err))).into_response()
}
