//! Common API types and utilities

use axum::http::{StatusCode, Uri};
use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard response envelope. Every endpoint, success or failure, answers
/// with `success` plus an optional human message and payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

/// Router fallback. Unknown routes answer with the same error envelope
/// as every other failure instead of axum's empty-body 404.
pub async fn not_found_handler(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": { "message": format!("Route {} not found", uri) },
        })),
    )
}
