//! Platform API Integration Tests
//!
//! Tests for domain models, response rendering, validation, and the
//! upcoming-event ordering. Nothing here needs a database; the
//! registration protocol itself is covered in `registration_tests.rs`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};

use rally_platform::domain::{percentage_filled, EventStats, EventSummary};
use rally_platform::error::PlatformError;
use rally_platform::service::ordering;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Error rendering tests
mod error_tests {
    use super::*;

    #[tokio::test]
    async fn event_full_renders_400_with_envelope() {
        let response = PlatformError::EventFull.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"]["message"],
            "Event is full. Registration capacity has been reached"
        );
    }

    #[tokio::test]
    async fn not_found_renders_404_naming_the_entity() {
        let response = PlatformError::not_found("Event").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Event not found");
    }

    #[tokio::test]
    async fn duplicate_registration_renders_409() {
        let response = PlatformError::AlreadyRegistered.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            "User is already registered for this event"
        );
    }

    #[tokio::test]
    async fn validation_errors_render_per_field() {
        let err = rally_platform::api::validation::validate_create_event(
            "ab",
            "not-a-date",
            "x",
            5000,
        )
        .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e["field"].is_string() && e["message"].is_string()));
    }

    #[tokio::test]
    async fn transient_errors_render_503() {
        let response = PlatformError::transient("pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() {
        let response = PlatformError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Internal Server Error");
    }
}

// Fallback route tests
mod fallback_tests {
    use super::*;
    use axum::http::Uri;
    use rally_platform::api::not_found_handler;

    #[tokio::test]
    async fn unknown_routes_render_the_error_envelope() {
        let uri = Uri::from_static("/api/nope");
        let response = not_found_handler(uri).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], "Route /api/nope not found");
    }
}

// Stats derivation tests
mod stats_tests {
    use super::*;

    #[test]
    fn percentage_survives_zero_capacity() {
        assert_eq!(percentage_filled(0, 0), 0.0);
    }

    #[test]
    fn stats_report_remaining_and_percentage() {
        let stats = EventStats {
            event_id: 1,
            event_title: "Launch".to_string(),
            capacity: 3,
            total_registrations: 2,
        };
        assert_eq!(stats.remaining_capacity(), 1);
        assert_eq!(stats.percentage_filled(), 66.67);
    }
}

// Upcoming ordering tests
mod ordering_tests {
    use super::*;

    fn upcoming(id: i64, days: i64, location: &str) -> EventSummary {
        EventSummary {
            id,
            title: format!("Event {id}"),
            date_time: Utc::now() + Duration::days(days),
            location: location.to_string(),
            capacity: 100,
            current_registrations: 0,
        }
    }

    #[test]
    fn same_day_events_order_by_location() {
        // Snapshot arrives as [tomorrow@B, tomorrow@A]; the list must come
        // back as [tomorrow@A, tomorrow@B].
        let mut events = vec![upcoming(1, 1, "B"), upcoming(2, 1, "A")];
        // Both events are meant to share the same instant; the helper calls
        // Utc::now() per event, so pin the second to the first.
        events[1].date_time = events[0].date_time;
        ordering::sort_upcoming(&mut events);

        let locations: Vec<&str> = events.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, vec!["A", "B"]);
    }

    #[test]
    fn earlier_dates_come_first_regardless_of_location() {
        let mut events = vec![upcoming(1, 7, "A"), upcoming(2, 1, "Z")];
        ordering::sort_upcoming(&mut events);
        assert_eq!(events[0].id, 2);
    }
}
