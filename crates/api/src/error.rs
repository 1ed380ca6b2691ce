use a4l_core::error::CoreError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `a4l_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request body that could not be read as the expected JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Map a domain error to its HTTP status, error code and client message.
fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    let message = core.to_string();
    match core {
        CoreError::DuplicateName(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_NAME", message),
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        CoreError::SystemRoleImmutable(_) => {
            (StatusCode::FORBIDDEN, "SYSTEM_ROLE_IMMUTABLE", message)
        }
        CoreError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
        }
        CoreError::UnverifiedAccount => (StatusCode::FORBIDDEN, "UNVERIFIED_ACCOUNT", message),
        CoreError::Authorization(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", message),
        CoreError::TokenNotFound => (StatusCode::BAD_REQUEST, "TOKEN_NOT_FOUND", message),
        CoreError::TokenExpired => (StatusCode::BAD_REQUEST, "TOKEN_EXPIRED", message),
        CoreError::InvalidRequestState(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_REQUEST_STATE", message)
        }
        CoreError::AttemptsExceeded(_) => {
            (StatusCode::TOO_MANY_REQUESTS, "ATTEMPTS_EXCEEDED", message)
        }
        CoreError::InvalidCode { .. } => (StatusCode::BAD_REQUEST, "INVALID_CODE", message),
        CoreError::CodeExpired => (StatusCode::BAD_REQUEST, "CODE_EXPIRED", message),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Notification(msg) => {
            tracing::error!(error = %msg, "Notification delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOTIFICATION_FAILED",
                "The notification could not be sent".to_string(),
            )
        }
        CoreError::Store(msg) | CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::Core(CoreError::InvalidCode { remaining }) = &self {
            body["remaining_attempts"] = json!(remaining);
        }

        (status, axum::Json(body)).into_response()
    }
}
