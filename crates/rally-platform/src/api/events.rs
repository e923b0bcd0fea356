//! Events API
//!
//! REST endpoints for event creation, upcoming queries, stats, and the
//! registration write paths. Base path: /api/events

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
use crate::api::validation::{validate_create_event, validate_id};
use crate::domain::{Event, EventDetails, EventStats, EventSummary, RegisteredUser, Registration};
use crate::error::{PlatformError, Result};
use crate::repository::EventRepository;
use crate::service::{ordering, RegistrationService};

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Create event request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event title (3-255 chars)
    pub title: String,

    /// ISO 8601 timestamp, timezone-aware
    pub date_time: String,

    /// Venue (2-255 chars)
    pub location: String,

    /// Maximum registrations (1-1000)
    pub capacity: i64,
}

/// Register / cancel request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    pub user_id: i64,
    pub event_id: i64,
}

/// Event response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i32,
    pub created_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            date_time: event.date_time.to_rfc3339(),
            location: event.location,
            capacity: event.capacity,
            created_at: event.created_at.to_rfc3339(),
        }
    }
}

/// Created event response
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedEventResponse {
    pub event_id: i64,
    pub event: EventResponse,
}

/// Upcoming event with its live registration count
#[derive(Debug, Serialize, ToSchema)]
pub struct UpcomingEventResponse {
    pub id: i64,
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i32,
    pub current_registrations: i64,
}

impl From<EventSummary> for UpcomingEventResponse {
    fn from(summary: EventSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            date_time: summary.date_time.to_rfc3339(),
            location: summary.location,
            capacity: summary.capacity,
            current_registrations: summary.current_registrations,
        }
    }
}

/// Upcoming events list response
#[derive(Debug, Serialize, ToSchema)]
pub struct UpcomingEventsResponse {
    pub count: usize,
    pub events: Vec<UpcomingEventResponse>,
}

/// Roster entry DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub registered_at: String,
}

impl From<RegisteredUser> for RegisteredUserResponse {
    fn from(user: RegisteredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            registered_at: user.registered_at.to_rfc3339(),
        }
    }
}

/// Event details with roster
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDetailsResponse {
    pub id: i64,
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i32,
    pub created_at: String,
    pub registered_users: Vec<RegisteredUserResponse>,
    pub current_registrations: usize,
}

impl From<EventDetails> for EventDetailsResponse {
    fn from(details: EventDetails) -> Self {
        let current_registrations = details.current_registrations();
        Self {
            id: details.event.id,
            title: details.event.title,
            date_time: details.event.date_time.to_rfc3339(),
            location: details.event.location,
            capacity: details.event.capacity,
            created_at: details.event.created_at.to_rfc3339(),
            registered_users: details
                .registered_users
                .into_iter()
                .map(|u| u.into())
                .collect(),
            current_registrations,
        }
    }
}

/// Capacity statistics response
#[derive(Debug, Serialize, ToSchema)]
pub struct EventStatsResponse {
    pub event_id: i64,
    pub event_title: String,
    pub capacity: i32,
    pub total_registrations: i64,
    pub remaining_capacity: i64,
    pub percentage_filled: f64,
}

impl From<EventStats> for EventStatsResponse {
    fn from(stats: EventStats) -> Self {
        Self {
            event_id: stats.event_id,
            capacity: stats.capacity,
            total_registrations: stats.total_registrations,
            remaining_capacity: stats.remaining_capacity(),
            percentage_filled: stats.percentage_filled(),
            event_title: stats.event_title,
        }
    }
}

/// Successful registration response
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub registration_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub registered_at: String,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            registration_id: registration.id,
            user_id: registration.user_id,
            event_id: registration.event_id,
            registered_at: registration.registered_at.to_rfc3339(),
        }
    }
}

/// Successful cancellation response
#[derive(Debug, Serialize, ToSchema)]
pub struct CancellationResponse {
    pub user_id: i64,
    pub event_id: i64,
}

// ============================================================================
// State and handlers
// ============================================================================

/// Events service state
#[derive(Clone)]
pub struct EventsState {
    pub event_repo: Arc<EventRepository>,
    pub registration_service: Arc<RegistrationService>,
}

/// Create a new event
#[utoipa::path(
    post,
    path = "",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = ApiResponse<CreatedEventResponse>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_event(
    State(state): State<EventsState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedEventResponse>>)> {
    let new_event = validate_create_event(&req.title, &req.date_time, &req.location, req.capacity)?;

    let event = state.event_repo.create(&new_event).await?;
    tracing::info!(event_id = event.id, title = %event.title, "event created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Event created successfully",
            CreatedEventResponse {
                event_id: event.id,
                event: event.into(),
            },
        )),
    ))
}

/// List upcoming events, soonest first, location breaking ties
#[utoipa::path(
    get,
    path = "/upcoming",
    tag = "events",
    responses(
        (status = 200, description = "Upcoming events", body = ApiResponse<UpcomingEventsResponse>)
    )
)]
pub async fn list_upcoming_events(
    State(state): State<EventsState>,
) -> Result<Json<ApiResponse<UpcomingEventsResponse>>> {
    let mut events = state.event_repo.find_upcoming().await?;
    ordering::sort_upcoming(&mut events);

    Ok(Json(ApiResponse::data(UpcomingEventsResponse {
        count: events.len(),
        events: events.into_iter().map(|e| e.into()).collect(),
    })))
}

/// Get an event with its roster
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = ApiResponse<EventDetailsResponse>),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event_details(
    State(state): State<EventsState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EventDetailsResponse>>> {
    let id = validate_id("id", id)?;

    let details = state
        .event_repo
        .find_details(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event"))?;

    Ok(Json(ApiResponse::data(details.into())))
}

/// Get capacity statistics for an event
#[utoipa::path(
    get,
    path = "/{id}/stats",
    tag = "events",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event statistics", body = ApiResponse<EventStatsResponse>),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event_stats(
    State(state): State<EventsState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EventStatsResponse>>> {
    let id = validate_id("id", id)?;

    let stats = state
        .event_repo
        .stats(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event"))?;

    Ok(Json(ApiResponse::data(stats.into())))
}

/// Register a user for an event
#[utoipa::path(
    post,
    path = "/register",
    tag = "events",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registered", body = ApiResponse<RegistrationResponse>),
        (status = 400, description = "Event in the past or full"),
        (status = 404, description = "User or event not found"),
        (status = 409, description = "Already registered"),
        (status = 503, description = "Store contention, retry")
    )
)]
pub async fn register_for_event(
    State(state): State<EventsState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegistrationResponse>>)> {
    let user_id = validate_id("user_id", req.user_id)?;
    let event_id = validate_id("event_id", req.event_id)?;

    let registration = state.registration_service.register(user_id, event_id).await?;
    tracing::info!(user_id, event_id, registration_id = registration.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Successfully registered for the event",
            registration.into(),
        )),
    ))
}

/// Cancel a registration
#[utoipa::path(
    post,
    path = "/cancel",
    tag = "events",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Cancelled", body = ApiResponse<CancellationResponse>),
        (status = 404, description = "User, event, or registration not found")
    )
)]
pub async fn cancel_registration(
    State(state): State<EventsState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<ApiResponse<CancellationResponse>>> {
    let user_id = validate_id("user_id", req.user_id)?;
    let event_id = validate_id("event_id", req.event_id)?;

    let cancelled = state.registration_service.cancel(user_id, event_id).await?;
    tracing::info!(user_id, event_id, registration_id = cancelled.id, "registration cancelled");

    Ok(Json(ApiResponse::with_message(
        "Registration cancelled successfully",
        CancellationResponse { user_id, event_id },
    )))
}

pub fn events_router(state: EventsState) -> Router {
    Router::new()
        .route("/", post(create_event))
        .route("/upcoming", get(list_upcoming_events))
        .route("/register", post(register_for_event))
        .route("/cancel", post(cancel_registration))
        .route("/:id", get(get_event_details))
        .route("/:id/stats", get(get_event_stats))
        .with_state(state)
}
