//! Rally Platform
//!
//! Core platform providing:
//! - Event creation and upcoming-event queries
//! - Capacity-safe registration with per-event row locking
//! - Registration cancellation
//! - User management and per-user event listings

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

pub use domain::*;
pub use error::PlatformError;
