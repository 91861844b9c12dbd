//! Row models shared by every [`Store`](crate::Store) implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Attendees returned per listing page.
pub const PAGE_SIZE: i64 = 10;

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub details: Option<String>,
    pub maximum_attendees: Option<i32>,
}

/// Insert payload for an event. The id is chosen by the caller.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub details: Option<String>,
    pub maximum_attendees: Option<i32>,
}

/// An event together with its current number of attendees.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub details: Option<String>,
    pub maximum_attendees: Option<i32>,
    pub attendees_amount: i64,
}

/// Capacity snapshot used by the registration guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct EventCapacity {
    pub maximum_attendees: Option<i32>,
    pub attendees_amount: i64,
}

impl EventCapacity {
    /// `true` once the configured capacity has been reached.
    pub fn is_full(&self) -> bool {
        match self.maximum_attendees {
            Some(maximum) => self.attendees_amount >= i64::from(maximum),
            None => false,
        }
    }
}

/// A row from the `attendees` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Attendee {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendee {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
}

/// A row from the `check_ins` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CheckIn {
    pub id: i32,
    pub attendee_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Attendee joined with the title and slug of its event.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AttendeeBadge {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub event_title: String,
    pub event_slug: String,
}

/// Listing filter: `query` matches names case-insensitively.
#[derive(Debug, Clone)]
pub struct AttendeeFilter {
    pub event_id: Uuid,
    pub query: Option<String>,
    pub page_index: u32,
}

impl AttendeeFilter {
    pub fn offset(&self) -> i64 {
        i64::from(self.page_index) * PAGE_SIZE
    }

    /// The trimmed search term, `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AttendeeListItem {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub check_in_at: Option<DateTime<Utc>>,
}

/// Count of matching attendees and one page of them, read as one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeePage {
    pub count: i64,
    pub attendees: Vec<AttendeeListItem>,
}
