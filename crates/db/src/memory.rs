//! In-process [`Store`] used by tests and by local runs without PostgreSQL.
//!
//! All tables live behind one mutex, so every operation observes and mutates
//! a consistent state, including the listing snapshot.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{
    StoreError, StoreResult, ATTENDEE_EMAIL_CONSTRAINT, CHECK_IN_CONSTRAINT,
    EVENT_SLUG_CONSTRAINT,
};
use crate::models::{
    Attendee, AttendeeBadge, AttendeeFilter, AttendeeListItem, AttendeePage, CheckIn, Event,
    EventCapacity, EventSummary, NewAttendee, NewEvent, PAGE_SIZE,
};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    events: BTreeMap<Uuid, Event>,
    attendees: BTreeMap<i32, Attendee>,
    check_ins: BTreeMap<i32, CheckIn>,
    attendee_seq: i32,
    check_in_seq: i32,
}

impl Tables {
    fn attendees_of(&self, event_id: Uuid) -> impl Iterator<Item = &Attendee> {
        self.attendees
            .values()
            .filter(move |attendee| attendee.event_id == event_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Writes happen only after every check passed, so a poisoned lock
        // still guards consistent tables.
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored check-ins.
    pub fn check_in_count(&self) -> usize {
        self.tables().check_ins.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let tables = self.tables();
        Ok(tables
            .events
            .values()
            .find(|event| event.slug == slug)
            .cloned())
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables();
        if tables.events.values().any(|e| e.slug == event.slug) {
            return Err(StoreError::UniqueViolation {
                constraint: EVENT_SLUG_CONSTRAINT.to_string(),
            });
        }

        let created = Event {
            id: event.id,
            title: event.title,
            slug: event.slug,
            details: event.details,
            maximum_attendees: event.maximum_attendees,
        };
        tables.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_event_summary(&self, event_id: Uuid) -> StoreResult<Option<EventSummary>> {
        let tables = self.tables();
        Ok(tables.events.get(&event_id).map(|event| EventSummary {
            id: event.id,
            title: event.title.clone(),
            slug: event.slug.clone(),
            details: event.details.clone(),
            maximum_attendees: event.maximum_attendees,
            attendees_amount: tables.attendees_of(event_id).count() as i64,
        }))
    }

    async fn event_capacity(&self, event_id: Uuid) -> StoreResult<Option<EventCapacity>> {
        let tables = self.tables();
        Ok(tables.events.get(&event_id).map(|event| EventCapacity {
            maximum_attendees: event.maximum_attendees,
            attendees_amount: tables.attendees_of(event_id).count() as i64,
        }))
    }

    async fn find_attendee_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<Attendee>> {
        let tables = self.tables();
        let found = tables
            .attendees_of(event_id)
            .find(|attendee| attendee.email == email)
            .cloned();
        Ok(found)
    }

    async fn insert_attendee(&self, attendee: NewAttendee) -> StoreResult<Attendee> {
        let mut tables = self.tables();

        let Some(event) = tables.events.get(&attendee.event_id) else {
            return Err(StoreError::MissingReference { entity: "event" });
        };

        let capacity = EventCapacity {
            maximum_attendees: event.maximum_attendees,
            attendees_amount: tables.attendees_of(attendee.event_id).count() as i64,
        };
        if capacity.is_full() {
            return Err(StoreError::CapacityExceeded {
                event_id: attendee.event_id,
            });
        }

        if tables
            .attendees_of(attendee.event_id)
            .any(|existing| existing.email == attendee.email)
        {
            return Err(StoreError::UniqueViolation {
                constraint: ATTENDEE_EMAIL_CONSTRAINT.to_string(),
            });
        }

        tables.attendee_seq += 1;
        let created = Attendee {
            id: tables.attendee_seq,
            name: attendee.name,
            email: attendee.email,
            event_id: attendee.event_id,
            created_at: Utc::now(),
        };
        tables.attendees.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_badge(&self, attendee_id: i32) -> StoreResult<Option<AttendeeBadge>> {
        let tables = self.tables();
        let badge = tables.attendees.get(&attendee_id).and_then(|attendee| {
            tables
                .events
                .get(&attendee.event_id)
                .map(|event| AttendeeBadge {
                    id: attendee.id,
                    name: attendee.name.clone(),
                    email: attendee.email.clone(),
                    event_title: event.title.clone(),
                    event_slug: event.slug.clone(),
                })
        });
        Ok(badge)
    }

    async fn find_check_in(&self, attendee_id: i32) -> StoreResult<Option<CheckIn>> {
        let tables = self.tables();
        Ok(tables
            .check_ins
            .values()
            .find(|check_in| check_in.attendee_id == attendee_id)
            .cloned())
    }

    async fn insert_check_in(&self, attendee_id: i32) -> StoreResult<CheckIn> {
        let mut tables = self.tables();

        if !tables.attendees.contains_key(&attendee_id) {
            return Err(StoreError::MissingReference { entity: "attendee" });
        }
        if tables
            .check_ins
            .values()
            .any(|check_in| check_in.attendee_id == attendee_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: CHECK_IN_CONSTRAINT.to_string(),
            });
        }

        tables.check_in_seq += 1;
        let created = CheckIn {
            id: tables.check_in_seq,
            attendee_id,
            created_at: Utc::now(),
        };
        tables.check_ins.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_attendees(&self, filter: &AttendeeFilter) -> StoreResult<AttendeePage> {
        let tables = self.tables();
        let needle = filter.search_term().map(str::to_lowercase);

        let mut matching: Vec<&Attendee> = tables
            .attendees_of(filter.event_id)
            .filter(|attendee| match &needle {
                Some(needle) => attendee.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let count = matching.len() as i64;
        let attendees = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(PAGE_SIZE as usize)
            .map(|attendee| AttendeeListItem {
                id: attendee.id,
                name: attendee.name.clone(),
                email: attendee.email.clone(),
                created_at: attendee.created_at,
                check_in_at: tables
                    .check_ins
                    .values()
                    .find(|check_in| check_in.attendee_id == attendee.id)
                    .map(|check_in| check_in.created_at),
            })
            .collect();

        Ok(AttendeePage { count, attendees })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(slug: &str, maximum_attendees: Option<i32>) -> NewEvent {
        NewEvent {
            id: Uuid::new_v4(),
            title: slug.to_string(),
            slug: slug.to_string(),
            details: None,
            maximum_attendees,
        }
    }

    fn new_attendee(event_id: Uuid, name: &str) -> NewAttendee {
        NewAttendee {
            event_id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn slug_is_unique() {
        let store = MemoryStore::new();
        store.insert_event(new_event("summit", None)).await.unwrap();

        let err = store
            .insert_event(new_event("summit", None))
            .await
            .unwrap_err();
        assert!(err.violates(EVENT_SLUG_CONSTRAINT));
    }

    #[tokio::test]
    async fn attendee_insert_enforces_email_and_capacity() {
        let store = MemoryStore::new();
        let event = store
            .insert_event(new_event("workshop", Some(2)))
            .await
            .unwrap();

        let first = store
            .insert_attendee(new_attendee(event.id, "Ana"))
            .await
            .unwrap();
        assert_eq!(first.id, 1);

        let err = store
            .insert_attendee(new_attendee(event.id, "Ana"))
            .await
            .unwrap_err();
        assert!(err.violates(ATTENDEE_EMAIL_CONSTRAINT));

        store
            .insert_attendee(new_attendee(event.id, "Bruno"))
            .await
            .unwrap();
        let err = store
            .insert_attendee(new_attendee(event.id, "Carla"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn attendee_for_unknown_event_is_a_missing_reference() {
        let store = MemoryStore::new();
        let err = store
            .insert_attendee(new_attendee(Uuid::new_v4(), "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "event" }));
    }

    #[tokio::test]
    async fn check_in_requires_existing_attendee_and_is_unique() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event("meetup", None)).await.unwrap();
        let attendee = store
            .insert_attendee(new_attendee(event.id, "Ana"))
            .await
            .unwrap();

        let err = store.insert_check_in(99).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference { entity: "attendee" }
        ));

        store.insert_check_in(attendee.id).await.unwrap();
        let err = store.insert_check_in(attendee.id).await.unwrap_err();
        assert!(err.violates(CHECK_IN_CONSTRAINT));
        assert_eq!(store.check_in_count(), 1);
    }

    #[tokio::test]
    async fn listing_filters_case_insensitively_and_pages_newest_first() {
        let store = MemoryStore::new();
        let event = store.insert_event(new_event("conf", None)).await.unwrap();
        for i in 0..12 {
            store
                .insert_attendee(new_attendee(event.id, &format!("Maria{i}")))
                .await
                .unwrap();
        }
        store
            .insert_attendee(new_attendee(event.id, "Joao"))
            .await
            .unwrap();

        let page = store
            .list_attendees(&AttendeeFilter {
                event_id: event.id,
                query: Some("MARIA".to_string()),
                page_index: 1,
            })
            .await
            .unwrap();

        assert_eq!(page.count, 12);
        assert_eq!(page.attendees.len(), 2);
        // Oldest two of the twelve land on the second page.
        let ids: Vec<i32> = page.attendees.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(page.attendees.iter().all(|a| a.check_in_at.is_none()));
    }

    #[tokio::test]
    async fn attendee_lookup_by_email_is_scoped_to_the_event() {
        let store = MemoryStore::new();
        let summit = store.insert_event(new_event("summit", None)).await.unwrap();
        let meetup = store.insert_event(new_event("meetup", None)).await.unwrap();
        let ana = store
            .insert_attendee(new_attendee(summit.id, "Ana"))
            .await
            .unwrap();

        let found = store
            .find_attendee_by_email(summit.id, "ana@example.com")
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.id), Some(ana.id));

        let elsewhere = store
            .find_attendee_by_email(meetup.id, "ana@example.com")
            .await
            .unwrap();
        assert!(elsewhere.is_none());
    }
}
