//! Registration Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The many-to-many edge between a user and an event. At most one row may
/// exist per (user_id, event_id) pair; the database enforces this with a
/// unique constraint. Cancellation deletes the row outright.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub registered_at: DateTime<Utc>,
}
