//! Platform Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("User is already registered for this event")]
    AlreadyRegistered,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Cannot register for past events")]
    EventInPast,

    #[error("Event is full. Registration capacity has been reached")]
    EventFull,

    #[error("User is not registered for this event")]
    NotRegistered,

    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    #[error("Temporarily unavailable: {message}")]
    Transient { message: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl PlatformError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::NotRegistered => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::EventInPast | Self::EventFull | Self::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Transient { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Reinterpret storage failures that carry platform meaning.
///
/// A unique violation on the (user_id, event_id) key is the duplicate
/// registration race losing against the database constraint; it must read
/// as `AlreadyRegistered`, never as a raw storage error. Lock and pool
/// timeouts are retryable and map to `Transient`.
fn classify_sqlx(err: &sqlx::Error) -> Option<PlatformError> {
    match err {
        sqlx::Error::PoolTimedOut => Some(PlatformError::transient(
            "timed out waiting for a database connection",
        )),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => match db.constraint() {
                Some("users_email_key") => Some(PlatformError::DuplicateEmail),
                Some("registrations_user_id_event_id_key") => {
                    Some(PlatformError::AlreadyRegistered)
                }
                _ => None,
            },
            // foreign_key_violation: the referenced row is gone
            Some("23503") => Some(PlatformError::not_found("Referenced resource")),
            // lock_not_available: lock_timeout expired while waiting on the event row
            Some("55P03") => Some(PlatformError::transient(
                "timed out waiting for the event row lock",
            )),
            _ => None,
        },
        _ => None,
    }
}

impl From<sqlx::Error> for PlatformError {
    fn from(err: sqlx::Error) -> Self {
        match classify_sqlx(&err) {
            Some(mapped) => mapped,
            None => Self::Database(err),
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation { errors } => json!({
                "success": false,
                "errors": errors,
            }),
            Self::Database(err) => {
                tracing::error!("unexpected database error: {err}");
                json!({
                    "success": false,
                    "error": { "message": "Internal Server Error" },
                })
            }
            other => json!({
                "success": false,
                "error": { "message": other.to_string() },
            }),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
