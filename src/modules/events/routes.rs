use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use passin_db::models::AttendeeFilter;
use passin_http::{AppError, ValidJson, ValidPath, ValidQuery};
use uuid::Uuid;

use super::models::{
    AttendeeList, AttendeeListParams, AttendeeRegistered, CreateEvent, EventCreated,
    EventResponse, RegisterAttendee,
};
use crate::admission::AdmissionController;

/// `POST /events`
pub async fn create_event(
    State(admission): State<Arc<AdmissionController>>,
    ValidJson(input): ValidJson<CreateEvent>,
) -> Result<(StatusCode, Json<EventCreated>), AppError> {
    let event = admission.create_event(input.into()).await?;
    Ok((StatusCode::CREATED, Json(EventCreated { event_id: event.id })))
}

/// `GET /events/{eventId}`
pub async fn get_event(
    State(admission): State<Arc<AdmissionController>>,
    ValidPath(event_id): ValidPath<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let summary = admission.event_summary(event_id).await?;
    Ok(Json(EventResponse {
        event: summary.into(),
    }))
}

/// `POST /events/{eventId}/attendees`
pub async fn register_attendee(
    State(admission): State<Arc<AdmissionController>>,
    ValidPath(event_id): ValidPath<Uuid>,
    ValidJson(input): ValidJson<RegisterAttendee>,
) -> Result<(StatusCode, Json<AttendeeRegistered>), AppError> {
    let attendee_id = admission.register_attendee(event_id, input.into()).await?;
    Ok((StatusCode::CREATED, Json(AttendeeRegistered { attendee_id })))
}

/// `GET /events/{eventId}/attendees`
pub async fn list_attendees(
    State(admission): State<Arc<AdmissionController>>,
    ValidPath(event_id): ValidPath<Uuid>,
    ValidQuery(params): ValidQuery<AttendeeListParams>,
) -> Result<Json<AttendeeList>, AppError> {
    let page_index = params.page_index.unwrap_or(0);
    let filter = AttendeeFilter {
        event_id,
        query: params.query,
        page_index,
    };

    let page = admission.list_attendees(&filter).await?;
    tracing::debug!(%event_id, page_index, count = page.count, "attendees listed");

    Ok(Json(AttendeeList::from_page(page, page_index)))
}
