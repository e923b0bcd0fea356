//! Request validation
//!
//! Shape checks applied before any handler reaches the store or the
//! registration service. Failures are collected per field and rendered as
//! a 400 with `errors: [{field, message}]`.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::domain::NewEvent;
use crate::error::{FieldError, PlatformError, Result};

pub const TITLE_MIN: usize = 3;
pub const NAME_MIN: usize = 2;
pub const LOCATION_MIN: usize = 2;
pub const TEXT_MAX: usize = 255;
pub const CAPACITY_MIN: i64 = 1;
pub const CAPACITY_MAX: i64 = 1000;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Collects field errors so a response can report all of them at once.
#[derive(Debug, Default)]
struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, format!("{field} is required"));
            return None;
        }
        let len = trimmed.chars().count();
        if len < min || len > max {
            self.reject(field, format!("{field} must be between {min} and {max} characters"));
            return None;
        }
        Some(trimmed.to_string())
    }

    fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(PlatformError::validation(self.errors))
        }
    }
}

/// Validated event input: trimmed title and location, RFC 3339 date_time,
/// capacity within 1-1000.
pub fn validate_create_event(
    title: &str,
    date_time: &str,
    location: &str,
    capacity: i64,
) -> Result<NewEvent> {
    let mut v = Validator::default();

    let title = v.text("title", title, TITLE_MIN, TEXT_MAX);
    let location = v.text("location", location, LOCATION_MIN, TEXT_MAX);

    let parsed_date = match DateTime::parse_from_rfc3339(date_time.trim()) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            v.reject("date_time", "date_time must be an ISO 8601 timestamp");
            None
        }
    };

    if !(CAPACITY_MIN..=CAPACITY_MAX).contains(&capacity) {
        v.reject(
            "capacity",
            format!("capacity must be a positive integer between {CAPACITY_MIN} and {CAPACITY_MAX}"),
        );
    }

    v.finish()?;

    // finish() returned Ok, so every field parsed.
    Ok(NewEvent {
        title: title.unwrap_or_default(),
        date_time: parsed_date.unwrap_or_default(),
        location: location.unwrap_or_default(),
        capacity: capacity as i32,
    })
}

/// Validated user input: trimmed name, lowercased well-formed email.
pub fn validate_create_user(name: &str, email: &str) -> Result<(String, String)> {
    let mut v = Validator::default();

    let name = v.text("name", name, NAME_MIN, TEXT_MAX);

    let email = email.trim().to_lowercase();
    if email.is_empty() {
        v.reject("email", "email is required");
    } else if !email_regex().is_match(&email) {
        v.reject("email", "Invalid email format");
    }

    v.finish()?;
    Ok((name.unwrap_or_default(), email))
}

/// IDs are positive integers; anything else never reaches the store.
pub fn validate_id(field: &str, value: i64) -> Result<i64> {
    if value < 1 {
        return Err(PlatformError::validation(vec![FieldError::new(
            field,
            format!("{field} must be a positive integer"),
        )]));
    }
    Ok(value)
}
