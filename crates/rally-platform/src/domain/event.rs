//! Event Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled event with a fixed registration capacity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event has already started relative to `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date_time <= now
    }
}

/// Fields accepted when creating an event, already validated by the API
/// layer (title 3-255 chars, location 2-255 chars, capacity 1-1000).
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
}

/// An event annotated with its live registration count.
#[derive(Debug, Clone, FromRow)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub current_registrations: i64,
}

/// An event together with its roster, ordered by registration time.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub event: Event,
    pub registered_users: Vec<RegisteredUser>,
}

impl EventDetails {
    pub fn current_registrations(&self) -> usize {
        self.registered_users.len()
    }
}

/// One roster entry: a user joined through their registration.
#[derive(Debug, Clone, FromRow)]
pub struct RegisteredUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

/// Capacity statistics for a single event.
#[derive(Debug, Clone)]
pub struct EventStats {
    pub event_id: i64,
    pub event_title: String,
    pub capacity: i32,
    pub total_registrations: i64,
}

impl EventStats {
    pub fn remaining_capacity(&self) -> i64 {
        self.capacity as i64 - self.total_registrations
    }

    pub fn percentage_filled(&self) -> f64 {
        percentage_filled(self.total_registrations, self.capacity)
    }
}

/// Percentage of capacity consumed, rounded to two decimal places.
/// A zero capacity yields 0 rather than a division error.
pub fn percentage_filled(total_registrations: i64, capacity: i32) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    let ratio = total_registrations as f64 / capacity as f64;
    (ratio * 100.0 * 100.0).round() / 100.0
}
