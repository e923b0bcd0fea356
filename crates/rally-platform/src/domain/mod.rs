//! Domain Models
//!
//! Core entities persisted in PostgreSQL plus the read projections derived
//! from them. All IDs are database-assigned integers.

pub mod event;
pub mod registration;
pub mod user;

pub use event::*;
pub use registration::*;
pub use user::*;
