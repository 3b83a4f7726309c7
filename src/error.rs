use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application error, mapped to an HTTP status exactly once in
/// [`IntoResponse`]. Handlers return `Result<_, ApiError>` and never
/// touch status codes directly.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password; the two are deliberately
    /// indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Protected route called without a bearer token.
    #[error("Access denied: no token provided")]
    MissingToken,

    /// Token present but the signature is invalid or it has expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Unknown id or barcode.
    #[error("{0}")]
    NotFound(String),

    /// Email already registered (usuarios.email unique constraint).
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Barcode already registered (productos.codigo_barras unique constraint).
    #[error("Barcode already exists")]
    DuplicateBarcode,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            // route contract: duplicate barcode answers 400, not 409
            Self::DuplicateBarcode => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // internal detail is logged, never returned to the client
        let message = match &self {
            Self::Database(e) => {
                error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// True when the error is a Postgres unique-constraint violation (23505).
/// The constraint itself is the source of truth for duplicates; callers
/// never pre-check existence to enforce uniqueness.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
