//! Users API
//!
//! REST endpoints for user management and per-user event listings.
//! Base path: /api/users

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::ApiResponse;
use crate::api::validation::{validate_create_user, validate_id};
use crate::domain::{User, UserEvent};
use crate::error::{PlatformError, Result};
use crate::repository::UserRepository;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Display name (2-255 chars)
    pub name: String,

    /// Email address, globally unique
    pub email: String,
}

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// User list response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub count: usize,
    pub users: Vec<UserResponse>,
}

/// Identity subset echoed alongside a user's events
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummaryResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// One event a user is registered for
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEventResponse {
    pub id: i64,
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i32,
    pub registered_at: String,
}

impl From<UserEvent> for UserEventResponse {
    fn from(event: UserEvent) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date_time: event.date_time.to_rfc3339(),
            location: event.location,
            capacity: event.capacity,
            registered_at: event.registered_at.to_rfc3339(),
        }
    }
}

/// A user's registered events
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEventsResponse {
    pub user: UserSummaryResponse,
    pub events_count: usize,
    pub events: Vec<UserEventResponse>,
}

// ============================================================================
// State and handlers
// ============================================================================

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<UsersState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let (name, email) = validate_create_user(&req.name, &req.email)?;

    let user = state.user_repo.create(&name, &email).await?;
    tracing::info!(user_id = user.id, "user created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User created successfully",
            user.into(),
        )),
    ))
}

/// List all users, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = ApiResponse<UserListResponse>)
    )
)]
pub async fn list_users(
    State(state): State<UsersState>,
) -> Result<Json<ApiResponse<UserListResponse>>> {
    let users = state.user_repo.find_all().await?;

    Ok(Json(ApiResponse::data(UserListResponse {
        count: users.len(),
        users: users.into_iter().map(|u| u.into()).collect(),
    })))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let id = validate_id("id", id)?;

    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User"))?;

    Ok(Json(ApiResponse::data(user.into())))
}

/// List the events a user is registered for
#[utoipa::path(
    get,
    path = "/{id}/events",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's events", body = ApiResponse<UserEventsResponse>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_events(
    State(state): State<UsersState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserEventsResponse>>> {
    let id = validate_id("id", id)?;

    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User"))?;

    let events = state.user_repo.events_for(id).await?;

    Ok(Json(ApiResponse::data(UserEventsResponse {
        user: UserSummaryResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        events_count: events.len(),
        events: events.into_iter().map(|e| e.into()).collect(),
    })))
}

pub fn users_router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/events", get(get_user_events))
        .with_state(state)
}
