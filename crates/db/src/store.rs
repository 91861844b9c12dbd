use std::sync::Arc;

use async_trait::async_trait;
use passin_kernel::Migration;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    Attendee, AttendeeBadge, AttendeeFilter, AttendeePage, CheckIn, Event, EventCapacity,
    EventSummary, NewAttendee, NewEvent,
};

/// Shared handle to the storage backend.
pub type DynStore = Arc<dyn Store>;

/// Storage contract used by the request handlers.
///
/// Writes enforce the uniqueness and capacity invariants themselves:
/// - `insert_event` fails with a unique violation on `uq_events_slug`
/// - `insert_attendee` fails with a unique violation on
///   `uq_attendees_event_email`, `CapacityExceeded` when the event is full, or
///   `MissingReference` when the event does not exist
/// - `insert_check_in` fails with a unique violation on `uq_check_ins_attendee`
///   or `MissingReference` when the attendee does not exist
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Apply pending migrations, returning how many ran.
    async fn migrate(&self, _migrations: &[(String, Migration)]) -> StoreResult<usize> {
        Ok(0)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Release connections. Called once at shutdown.
    async fn close(&self) {}

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>>;

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;

    async fn find_event_summary(&self, event_id: Uuid) -> StoreResult<Option<EventSummary>>;

    /// `None` when the event does not exist.
    async fn event_capacity(&self, event_id: Uuid) -> StoreResult<Option<EventCapacity>>;

    async fn find_attendee_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<Attendee>>;

    async fn insert_attendee(&self, attendee: NewAttendee) -> StoreResult<Attendee>;

    async fn find_badge(&self, attendee_id: i32) -> StoreResult<Option<AttendeeBadge>>;

    async fn find_check_in(&self, attendee_id: i32) -> StoreResult<Option<CheckIn>>;

    async fn insert_check_in(&self, attendee_id: i32) -> StoreResult<CheckIn>;

    /// Count and page of matching attendees, newest first, from one snapshot.
    async fn list_attendees(&self, filter: &AttendeeFilter) -> StoreResult<AttendeePage>;
}
