use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Request-level failure taxonomy. Every handler turns its outcome into one
/// of these before the response boundary; nothing propagates further up.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required field missing or malformed. Rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Duplicate email or referenced role not found.
    #[error("{0}")]
    Conflict(String),

    /// Target record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The authorization gate denied the (principal, resource, action) triple.
    #[error("you do not have permission to access this endpoint")]
    PermissionDenied,

    /// No authenticated principal on a route that requires one.
    #[error("not authenticated")]
    Unauthenticated,

    /// Login with an unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Store unreachable or other unexpected failure. Logged server-side,
    /// reported generically.
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            // The UI contract reports all client-data errors as 400,
            // conflicts and not-found included.
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// True when the error wraps a Postgres unique-constraint violation
/// (SQLSTATE 23505). Inserts racing past the duplicate-email pre-check end
/// up here and are reported as a conflict instead of a 500.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
