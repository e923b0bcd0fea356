//! API Layer
//!
//! REST API endpoints for the platform. Shape validation happens here;
//! handlers pass already-typed arguments down to repositories and the
//! registration service and render their typed results.

pub mod common;
pub mod events;
pub mod openapi;
pub mod users;
pub mod validation;

pub use common::{not_found_handler, ApiResponse};
pub use events::{events_router, EventsState};
pub use openapi::PlatformApiDoc;
pub use users::{users_router, UsersState};
