//! Admission guards for the state-changing operations.
//!
//! Every write is preceded by a read that produces a descriptive rejection,
//! but the store's own constraint verdicts are authoritative: a concurrent
//! request that slips past the read is still rejected by the write.

use passin_db::error::{ATTENDEE_EMAIL_CONSTRAINT, CHECK_IN_CONSTRAINT, EVENT_SLUG_CONSTRAINT};
use passin_db::models::{
    AttendeeBadge, AttendeeFilter, AttendeePage, CheckIn, Event, EventSummary, NewAttendee,
    NewEvent,
};
use passin_db::{DynStore, StoreError};
use passin_http::AppError;
use uuid::Uuid;

use crate::utils::generate_slug;

const ALREADY_REGISTERED: &str = "Attendee is already registered for this event.";
const EVENT_FULL: &str = "Event has reached its maximum number of attendees.";
const ALREADY_CHECKED_IN: &str = "Attendee has already checked in.";
const ATTENDEE_NOT_FOUND: &str = "Attendee not registered.";

/// Input for [`AdmissionController::create_event`], already validated.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub details: Option<String>,
    pub maximum_attendees: Option<i32>,
}

/// Input for [`AdmissionController::register_attendee`], already validated.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
}

fn event_not_found(event_id: Uuid) -> AppError {
    AppError::not_found(format!("Event with id {event_id} does not exist."))
}

fn duplicate_event(title: &str) -> AppError {
    AppError::duplicate(format!("Event \"{title}\" already exists."))
}

/// Guards event creation, registration and check-in over one store handle.
pub struct AdmissionController {
    store: DynStore,
}

impl AdmissionController {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    /// Create an event whose slug is derived from its title.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, AppError> {
        let slug = generate_slug(&draft.title);

        if let Some(existing) = self
            .store
            .find_event_by_slug(&slug)
            .await
            .map_err(AppError::internal)?
        {
            return Err(duplicate_event(&existing.title));
        }

        let new_event = NewEvent {
            id: Uuid::new_v4(),
            title: draft.title,
            slug,
            details: draft.details,
            maximum_attendees: draft.maximum_attendees,
        };

        match self.store.insert_event(new_event.clone()).await {
            Ok(event) => {
                tracing::info!(event_id = %event.id, slug = %event.slug, "event created");
                Ok(event)
            }
            Err(err) if err.violates(EVENT_SLUG_CONSTRAINT) => {
                let title = match self.store.find_event_by_slug(&new_event.slug).await {
                    Ok(Some(existing)) => existing.title,
                    _ => new_event.title,
                };
                Err(duplicate_event(&title))
            }
            Err(err) => Err(AppError::internal(err)),
        }
    }

    pub async fn event_summary(&self, event_id: Uuid) -> Result<EventSummary, AppError> {
        self.store
            .find_event_summary(event_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| event_not_found(event_id))
    }

    /// Register an attendee unless the email is taken or the event is full.
    pub async fn register_attendee(
        &self,
        event_id: Uuid,
        registration: Registration,
    ) -> Result<i32, AppError> {
        let existing = self
            .store
            .find_attendee_by_email(event_id, &registration.email)
            .await
            .map_err(AppError::internal)?;
        if existing.is_some() {
            return Err(AppError::duplicate(ALREADY_REGISTERED));
        }

        let capacity = self
            .store
            .event_capacity(event_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| event_not_found(event_id))?;
        if capacity.is_full() {
            return Err(AppError::capacity_exceeded(EVENT_FULL));
        }

        let new_attendee = NewAttendee {
            event_id,
            name: registration.name,
            email: registration.email,
        };

        match self.store.insert_attendee(new_attendee).await {
            Ok(attendee) => {
                tracing::info!(%event_id, attendee_id = attendee.id, "attendee registered");
                Ok(attendee.id)
            }
            Err(StoreError::CapacityExceeded { .. }) => {
                Err(AppError::capacity_exceeded(EVENT_FULL))
            }
            Err(StoreError::MissingReference { .. }) => Err(event_not_found(event_id)),
            Err(err) if err.violates(ATTENDEE_EMAIL_CONSTRAINT) => {
                Err(AppError::duplicate(ALREADY_REGISTERED))
            }
            Err(err) => Err(AppError::internal(err)),
        }
    }

    pub async fn badge(&self, attendee_id: i32) -> Result<AttendeeBadge, AppError> {
        self.store
            .find_badge(attendee_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found(ATTENDEE_NOT_FOUND))
    }

    /// Record the single check-in of an attendee.
    pub async fn check_in(&self, attendee_id: i32) -> Result<CheckIn, AppError> {
        let existing = self
            .store
            .find_check_in(attendee_id)
            .await
            .map_err(AppError::internal)?;
        if existing.is_some() {
            return Err(AppError::duplicate(ALREADY_CHECKED_IN));
        }

        match self.store.insert_check_in(attendee_id).await {
            Ok(check_in) => {
                tracing::info!(attendee_id, "attendee checked in");
                Ok(check_in)
            }
            Err(StoreError::MissingReference { .. }) => {
                Err(AppError::not_found(ATTENDEE_NOT_FOUND))
            }
            Err(err) if err.violates(CHECK_IN_CONSTRAINT) => {
                Err(AppError::duplicate(ALREADY_CHECKED_IN))
            }
            Err(err) => Err(AppError::internal(err)),
        }
    }

    pub async fn list_attendees(&self, filter: &AttendeeFilter) -> Result<AttendeePage, AppError> {
        self.store
            .list_attendees(filter)
            .await
            .map_err(AppError::internal)
    }
}
