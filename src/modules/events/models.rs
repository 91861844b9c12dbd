use chrono::{DateTime, Utc};
use passin_db::models::{AttendeeListItem, AttendeePage, EventSummary, PAGE_SIZE};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::admission::{EventDraft, Registration};

/// Body of `POST /events`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    #[validate(length(min = 4, message = "title must have at least 4 characters"))]
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "maximumAttendees must be a positive integer"))]
    pub maximum_attendees: Option<i32>,
}

impl From<CreateEvent> for EventDraft {
    fn from(input: CreateEvent) -> Self {
        EventDraft {
            title: input.title,
            details: input.details,
            maximum_attendees: input.maximum_attendees,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreated {
    pub event_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub details: Option<String>,
    pub slug: String,
    pub attendees_amount: i64,
    pub maximum_attendees: Option<i32>,
}

impl From<EventSummary> for EventView {
    fn from(summary: EventSummary) -> Self {
        EventView {
            id: summary.id,
            title: summary.title,
            details: summary.details,
            slug: summary.slug,
            attendees_amount: summary.attendees_amount,
            maximum_attendees: summary.maximum_attendees,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: EventView,
}

/// Body of `POST /events/{eventId}/attendees`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterAttendee {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

impl From<RegisterAttendee> for Registration {
    fn from(input: RegisterAttendee) -> Self {
        Registration {
            name: input.name,
            email: input.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRegistered {
    pub attendee_id: i32,
}

/// Query of `GET /events/{eventId}/attendees`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeListParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_index: Option<u32>,
    pub query: Option<String>,
}

/// `?pageIndex=` means the first page.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub check_in_at: Option<DateTime<Utc>>,
}

impl From<AttendeeListItem> for AttendeeView {
    fn from(item: AttendeeListItem) -> Self {
        AttendeeView {
            id: item.id,
            name: item.name,
            email: item.email,
            created_at: item.created_at,
            check_in_at: item.check_in_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeList {
    pub attendees: Vec<AttendeeView>,
    pub quantity_pages: i64,
    pub count: i64,
    pub showing: i64,
}

impl AttendeeList {
    pub fn from_page(page: AttendeePage, page_index: u32) -> Self {
        AttendeeList {
            quantity_pages: (page.count + PAGE_SIZE - 1) / PAGE_SIZE,
            count: page.count,
            showing: (i64::from(page_index) + 1) * PAGE_SIZE,
            attendees: page.attendees.into_iter().map(AttendeeView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: i64) -> AttendeePage {
        AttendeePage {
            count,
            attendees: Vec::new(),
        }
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(AttendeeList::from_page(page(0), 0).quantity_pages, 0);
        assert_eq!(AttendeeList::from_page(page(10), 0).quantity_pages, 1);
        assert_eq!(AttendeeList::from_page(page(25), 0).quantity_pages, 3);
    }

    #[test]
    fn showing_is_the_upper_bound_of_the_page() {
        assert_eq!(AttendeeList::from_page(page(25), 0).showing, 10);
        assert_eq!(AttendeeList::from_page(page(25), 2).showing, 30);
    }

    #[test]
    fn create_event_rules() {
        let valid = CreateEvent {
            title: "Unite Summit".to_string(),
            details: None,
            maximum_attendees: Some(120),
        };
        assert!(valid.validate().is_ok());

        let short = CreateEvent {
            title: "abc".to_string(),
            ..valid.clone()
        };
        assert!(short.validate().is_err());

        let zero = CreateEvent {
            maximum_attendees: Some(0),
            ..valid
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn blank_page_index_is_the_first_page() {
        let params: AttendeeListParams = serde_json::from_str(r#"{"pageIndex":""}"#).unwrap();
        assert_eq!(params.page_index, None);

        let params: AttendeeListParams = serde_json::from_str(r#"{"pageIndex":"2"}"#).unwrap();
        assert_eq!(params.page_index, Some(2));

        let params: AttendeeListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page_index, None);

        assert!(serde_json::from_str::<AttendeeListParams>(r#"{"pageIndex":"-1"}"#).is_err());
    }

    #[test]
    fn create_event_accepts_explicit_nulls() {
        let input: CreateEvent = serde_json::from_str(
            r#"{"title":"Unite Summit","details":null,"maximumAttendees":null}"#,
        )
        .unwrap();
        assert_eq!(input.maximum_attendees, None);
        assert!(input.validate().is_ok());
    }
}
