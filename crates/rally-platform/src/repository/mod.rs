//! Repository Layer
//!
//! PostgreSQL repositories for events, users and registrations. Reads take
//! one pooled connection under read-committed semantics; the registration
//! write path lives in `service::registration` because it needs a
//! transaction of its own.

pub mod event;
pub mod user;

pub use event::EventRepository;
pub use user::UserRepository;

use crate::error::Result;
use sqlx::PgPool;

/// Create tables and indexes if they do not exist yet.
///
/// The unique constraints are named explicitly because error mapping keys
/// on them: `users_email_key` and `registrations_user_id_event_id_key`.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            date_time TIMESTAMPTZ NOT NULL,
            location TEXT NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT users_email_key UNIQUE (email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registrations (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id),
            event_id BIGINT NOT NULL REFERENCES events(id),
            registered_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT registrations_user_id_event_id_key UNIQUE (user_id, event_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_registrations_event_id ON registrations(event_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
