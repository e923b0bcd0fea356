//! User Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Email addresses are globally unique and stored
/// lowercased.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An event a user is registered for, with the registration timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct UserEvent {
    pub id: i64,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub registered_at: DateTime<Utc>,
}
