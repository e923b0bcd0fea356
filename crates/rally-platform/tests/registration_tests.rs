//! Registration Engine Integration Tests
//!
//! Exercises the capacity-safe registration protocol against a real
//! PostgreSQL instance. Set `RALLY_TEST_DATABASE_URL` to run these; each
//! test skips cleanly when it is unset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as Delta, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use rally_platform::domain::NewEvent;
use rally_platform::error::PlatformError;
use rally_platform::repository::{self, EventRepository, UserRepository};
use rally_platform::service::{ordering, RegistrationService};

static SEQ: AtomicU64 = AtomicU64::new(0);

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("RALLY_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await
        .expect("failed to connect to RALLY_TEST_DATABASE_URL");
    repository::init_schema(&pool)
        .await
        .expect("schema init failed");
    Some(pool)
}

fn unique_email(tag: &str) -> String {
    let n = SEQ.fetch_add(1, Ordering::Relaxed);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{tag}-{}-{n}-{nanos}@example.com", std::process::id())
}

async fn new_user(pool: &PgPool, tag: &str) -> i64 {
    UserRepository::new(pool.clone())
        .create("Test User", &unique_email(tag))
        .await
        .expect("user insert failed")
        .id
}

async fn new_event(pool: &PgPool, capacity: i32, hours_from_now: i64) -> i64 {
    EventRepository::new(pool.clone())
        .create(&NewEvent {
            title: "Integration Event".to_string(),
            date_time: Utc::now() + Delta::hours(hours_from_now),
            location: "HQ".to_string(),
            capacity,
        })
        .await
        .expect("event insert failed")
        .id
}

async fn stored_count(pool: &PgPool, event_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

macro_rules! require_pool {
    () => {
        match test_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("skipping: RALLY_TEST_DATABASE_URL not set");
                return;
            }
        }
    };
}

#[tokio::test]
async fn concurrent_registrations_never_exceed_capacity() {
    let pool = require_pool!();
    let capacity = 3;
    let attempts = 10;

    let event_id = new_event(&pool, capacity, 24).await;
    let mut user_ids = Vec::new();
    for _ in 0..attempts {
        user_ids.push(new_user(&pool, "concurrent").await);
    }

    let service = Arc::new(RegistrationService::new(pool.clone()));
    let mut handles = Vec::new();
    for user_id in user_ids {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.register(user_id, event_id).await
        }));
    }

    let mut succeeded = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => succeeded += 1,
            Err(PlatformError::EventFull) => full += 1,
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }

    assert_eq!(succeeded, capacity as i64);
    assert_eq!(full, attempts - capacity as i64);
    assert_eq!(stored_count(&pool, event_id).await, capacity as i64);
}

#[tokio::test]
async fn duplicate_registration_is_rejected_and_leaves_one_row() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 10, 24).await;
    let user_id = new_user(&pool, "duplicate").await;

    let service = RegistrationService::new(pool.clone());
    service.register(user_id, event_id).await.expect("first registration");

    let second = service.register(user_id, event_id).await;
    assert!(matches!(second, Err(PlatformError::AlreadyRegistered)));
    assert_eq!(stored_count(&pool, event_id).await, 1);
}

#[tokio::test]
async fn cancel_then_reregister_succeeds() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 5, 24).await;
    let user_id = new_user(&pool, "reregister").await;

    let service = RegistrationService::new(pool.clone());
    let first = service.register(user_id, event_id).await.expect("register");

    let cancelled = service.cancel(user_id, event_id).await.expect("cancel");
    assert_eq!(cancelled.id, first.id);
    assert_eq!(stored_count(&pool, event_id).await, 0);

    service
        .register(user_id, event_id)
        .await
        .expect("re-register after cancel");
    assert_eq!(stored_count(&pool, event_id).await, 1);
}

#[tokio::test]
async fn cancel_without_registration_is_not_registered() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 5, 24).await;
    let user_id = new_user(&pool, "never-registered").await;

    let service = RegistrationService::new(pool.clone());
    let result = service.cancel(user_id, event_id).await;
    assert!(matches!(result, Err(PlatformError::NotRegistered)));
    assert_eq!(stored_count(&pool, event_id).await, 0);
}

#[tokio::test]
async fn past_events_reject_registration_but_allow_cancellation() {
    let pool = require_pool!();
    let user_id = new_user(&pool, "past").await;
    let future_event = new_event(&pool, 5, 24).await;
    let past_event = new_event(&pool, 5, -24).await;

    let service = RegistrationService::new(pool.clone());
    let result = service.register(user_id, past_event).await;
    assert!(matches!(result, Err(PlatformError::EventInPast)));

    // A registration whose event has since passed can still be cancelled;
    // simulate by registering for the future event and deleting directly.
    service.register(user_id, future_event).await.expect("register");
    service.cancel(user_id, future_event).await.expect("cancel");
}

#[tokio::test]
async fn capacity_one_event_accepts_exactly_one() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 1, 24).await;
    let first = new_user(&pool, "cap1-a").await;
    let second = new_user(&pool, "cap1-b").await;

    let service = RegistrationService::new(pool.clone());
    service.register(first, event_id).await.expect("first registration");

    let rejected = service.register(second, event_id).await;
    assert!(matches!(rejected, Err(PlatformError::EventFull)));
    assert_eq!(stored_count(&pool, event_id).await, 1);
}

#[tokio::test]
async fn unknown_ids_reject_with_not_found() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 5, 24).await;
    let user_id = new_user(&pool, "notfound").await;

    let service = RegistrationService::with_lock_timeout(pool.clone(), Duration::from_secs(2));

    let no_user = service.register(i64::MAX, event_id).await;
    assert!(matches!(
        no_user,
        Err(PlatformError::NotFound { entity: "User" })
    ));

    let no_event = service.register(user_id, i64::MAX).await;
    assert!(matches!(
        no_event,
        Err(PlatformError::NotFound { entity: "Event" })
    ));
}

#[tokio::test]
async fn upcoming_listing_excludes_past_events_and_orders_the_rest() {
    let pool = require_pool!();
    let repo = EventRepository::new(pool.clone());
    let tomorrow = Utc::now() + Delta::hours(24);

    // Same date on purpose: the tie must break on location, case-insensitively.
    let make = |title: &str, location: &str, date_time| NewEvent {
        title: title.to_string(),
        date_time,
        location: location.to_string(),
        capacity: 10,
    };
    let at_b = repo.create(&make("Upcoming B", "berlin", tomorrow)).await.expect("insert");
    let at_a = repo.create(&make("Upcoming A", "Austin", tomorrow)).await.expect("insert");
    let past = repo
        .create(&make("Already Over", "Austin", Utc::now() - Delta::hours(24)))
        .await
        .expect("insert");

    // Other tests share the database, so only look at our three rows.
    let ours = [at_b.id, at_a.id, past.id];
    let mut upcoming: Vec<_> = repo
        .find_upcoming()
        .await
        .expect("upcoming query")
        .into_iter()
        .filter(|e| ours.contains(&e.id))
        .collect();
    ordering::sort_upcoming(&mut upcoming);

    let ids: Vec<i64> = upcoming.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![at_a.id, at_b.id]);
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let pool = require_pool!();
    let repo = UserRepository::new(pool.clone());
    let email = unique_email("dup-email");

    repo.create("First Signup", &email).await.expect("first insert");
    let second = repo.create("Second Signup", &email).await;
    assert!(matches!(second, Err(PlatformError::DuplicateEmail)));
}

#[tokio::test]
async fn stats_track_registrations() {
    let pool = require_pool!();
    let event_id = new_event(&pool, 4, 24).await;
    let user_id = new_user(&pool, "stats").await;

    let service = RegistrationService::new(pool.clone());
    service.register(user_id, event_id).await.expect("register");

    let stats = EventRepository::new(pool.clone())
        .stats(event_id)
        .await
        .expect("stats query")
        .expect("event exists");
    assert_eq!(stats.total_registrations, 1);
    assert_eq!(stats.remaining_capacity(), 3);
    assert_eq!(stats.percentage_filled(), 25.0);
}
