//! Event Repository

use sqlx::PgPool;

use crate::domain::{Event, EventDetails, EventStats, EventSummary, NewEvent, RegisteredUser};
use crate::error::Result;

pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_event: &NewEvent) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, date_time, location, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, date_time, location, capacity, created_at
            "#,
        )
        .bind(&new_event.title)
        .bind(new_event.date_time)
        .bind(&new_event.location)
        .bind(new_event.capacity)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, date_time, location, capacity, created_at FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// Event plus its roster ordered by registration time ascending.
    pub async fn find_details(&self, id: i64) -> Result<Option<EventDetails>> {
        let Some(event) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let registered_users = sqlx::query_as::<_, RegisteredUser>(
            r#"
            SELECT u.id, u.name, u.email, r.registered_at
            FROM users u
            INNER JOIN registrations r ON u.id = r.user_id
            WHERE r.event_id = $1
            ORDER BY r.registered_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(EventDetails {
            event,
            registered_users,
        }))
    }

    /// All future events with their live registration counts. Ordering is
    /// applied in process by `service::ordering`, which is a pure function
    /// of this snapshot.
    pub async fn find_upcoming(&self) -> Result<Vec<EventSummary>> {
        let events = sqlx::query_as::<_, EventSummary>(
            r#"
            SELECT
                e.id,
                e.title,
                e.date_time,
                e.location,
                e.capacity,
                COUNT(r.id) AS current_registrations
            FROM events e
            LEFT JOIN registrations r ON e.id = r.event_id
            WHERE e.date_time > now()
            GROUP BY e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn stats(&self, id: i64) -> Result<Option<EventStats>> {
        let row = sqlx::query_as::<_, (String, i32, i64)>(
            r#"
            SELECT e.title, e.capacity, COUNT(r.id)
            FROM events e
            LEFT JOIN registrations r ON e.id = r.event_id
            WHERE e.id = $1
            GROUP BY e.id, e.title, e.capacity
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(event_title, capacity, total_registrations)| EventStats {
            event_id: id,
            event_title,
            capacity,
            total_registrations,
        }))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
