//! Registration Service
//!
//! The one place where correctness depends on locking rather than data
//! shaping. `register` must uphold, under genuinely parallel callers:
//! for every event, count(registrations) <= capacity, and at most one
//! registration per (user, event) pair.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::{Event, Registration};
use crate::error::{PlatformError, Result};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RegistrationService {
    pool: PgPool,
    lock_timeout: Duration,
}

impl RegistrationService {
    pub fn new(pool: PgPool) -> Self {
        Self::with_lock_timeout(pool, DEFAULT_LOCK_TIMEOUT)
    }

    /// `lock_timeout` bounds the wait for the event row lock; expiry maps
    /// to a retryable `Transient` error instead of blocking indefinitely.
    pub fn with_lock_timeout(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Register a user for an event.
    ///
    /// Preconditions, checked in order, each with its own rejection:
    /// user exists, event exists, event is in the future, no existing
    /// registration, capacity not reached. The duplicate and capacity
    /// checks plus the insert run in one transaction holding an exclusive
    /// lock on the event row (`SELECT ... FOR UPDATE`), so attempts for
    /// the same event serialize while other events proceed independently.
    /// Any failure after the lock is taken rolls the transaction back.
    pub async fn register(&self, user_id: i64, event_id: i64) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        // SET LOCAL scopes the bound to this transaction only.
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(PlatformError::not_found("User"));
        }

        // Write-intent lock on the event row. Everything below happens
        // with concurrent registrations for this event excluded.
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, date_time, location, capacity, created_at
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event"))?;

        if event.is_past(Utc::now()) {
            return Err(PlatformError::EventInPast);
        }

        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registrations WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_registered {
            return Err(PlatformError::AlreadyRegistered);
        }

        let current_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
        if current_count >= event.capacity as i64 {
            return Err(PlatformError::EventFull);
        }

        // The unique constraint on (user_id, event_id) backstops the
        // duplicate check; a 23505 here maps to AlreadyRegistered.
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (user_id, event_id)
            VALUES ($1, $2)
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(registration)
    }

    /// Cancel a registration, returning the deleted row.
    ///
    /// No lock discipline here: removing a row cannot violate the capacity
    /// invariant, and cancelling a past event's registration is allowed.
    pub async fn cancel(&self, user_id: i64, event_id: i64) -> Result<Registration> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_exists {
            return Err(PlatformError::not_found("User"));
        }

        let event_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        if !event_exists {
            return Err(PlatformError::not_found("Event"));
        }

        let deleted = sqlx::query_as::<_, Registration>(
            r#"
            DELETE FROM registrations
            WHERE user_id = $1 AND event_id = $2
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        deleted.ok_or(PlatformError::NotRegistered)
    }
}
