use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request body is not valid: {0}")]
    InvalidJson(String),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Username already exists. Choose another one.")]
    UsernameTaken,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("missing or unknown bearer token")]
    Unauthorized,

    /// A stored timestamp or date does not match the canonical format.
    #[error("unparseable stored timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => "invalid_json",
            AppError::InvalidInput { .. } => "invalid_input",
            AppError::NotFound { .. } => "not_found",
            AppError::UsernameTaken => "username_taken",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidTimestamp { .. } => "invalid_timestamp",
            AppError::Database(_) => "db_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_) | AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidTimestamp { .. } | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidJson(rejection.body_text())
    }
}

#[derive(Serialize)]
pub struct ErrResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        // Internal details stay in the log.
        let message = match &self {
            AppError::Database(_) => "database error".to_string(),
            other => other.to_string(),
        };
        (
            status,
            Json(ErrResponse {
                success: false,
                error: self.code(),
                message,
            }),
        )
            .into_response()
    }
}

/// Check if a rusqlite error is a UNIQUE constraint violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.code == rusqlite::ffi::ErrorCode::ConstraintViolation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_kind() {
        assert_eq!(
            AppError::invalid("title", "cannot be empty").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound { entity: "task" }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::UsernameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidTimestamp {
                value: "yesterday".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_input_message_names_field() {
        let e = AppError::invalid("mood", "must be 1-5");
        assert_eq!(e.to_string(), "invalid mood: must be 1-5");
        assert_eq!(e.code(), "invalid_input");
    }

    #[test]
    fn unique_violation_detected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
