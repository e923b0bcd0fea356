//! Service Layer
//!
//! Domain logic that is more than a single query: the capacity-safe
//! registration protocol and the deterministic upcoming-event ordering.

pub mod ordering;
pub mod registration;

pub use registration::RegistrationService;
