//! Upcoming-event ordering
//!
//! Deterministic ordering for the upcoming list: date_time ascending, then
//! location ascending case-insensitively, then stable. A pure function of
//! the snapshot it is given; no locking involved.

use std::cmp::Ordering;

use crate::domain::EventSummary;

pub fn upcoming_order(a: &EventSummary, b: &EventSummary) -> Ordering {
    a.date_time
        .cmp(&b.date_time)
        .then_with(|| a.location.to_lowercase().cmp(&b.location.to_lowercase()))
}

/// Stable sort, so events tied on both keys keep their snapshot order.
pub fn sort_upcoming(events: &mut [EventSummary]) {
    events.sort_by(upcoming_order);
}
