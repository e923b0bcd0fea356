//! OpenAPI document for the platform API.

use utoipa::OpenApi;

use crate::api::events;
use crate::api::users;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rally Platform API",
        description = "Event registration REST API with capacity-safe registration",
    ),
    paths(
        events::create_event,
        events::list_upcoming_events,
        events::get_event_details,
        events::get_event_stats,
        events::register_for_event,
        events::cancel_registration,
        users::create_user,
        users::list_users,
        users::get_user,
        users::get_user_events,
    ),
    tags(
        (name = "events", description = "Event management and registration"),
        (name = "users", description = "User management"),
    )
)]
pub struct PlatformApiDoc;
