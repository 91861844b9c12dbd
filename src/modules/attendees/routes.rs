use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use passin_http::{AppError, ValidPath};
use serde_json::json;

use super::models::BadgeResponse;
use crate::admission::AdmissionController;

/// State shared by the attendee routes.
#[derive(Clone)]
pub struct AttendeesState {
    pub admission: Arc<AdmissionController>,
    /// Authority used in check-in links when the request has no `Host`.
    pub public_authority: String,
}

fn attendee_id(raw: i32) -> Result<i32, AppError> {
    if raw > 0 {
        Ok(raw)
    } else {
        Err(AppError::validation(
            vec![json!({
                "field": "attendeeId",
                "code": "range",
                "message": "attendeeId must be a positive integer",
            })],
            "Invalid path parameters",
        ))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Absolute check-in link as seen by the client that asked for the badge.
pub(crate) fn check_in_url(
    headers: &HeaderMap,
    fallback_authority: &str,
    attendee_id: i32,
) -> String {
    let scheme = match header_str(headers, "x-forwarded-proto")
        .and_then(|proto| proto.split(',').next())
        .map(str::trim)
    {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let authority = header_str(headers, header::HOST.as_str()).unwrap_or(fallback_authority);

    format!("{scheme}://{authority}/attendees/{attendee_id}/check-in")
}

/// `GET /attendees/{attendeeId}/badge`
pub async fn get_badge(
    State(state): State<AttendeesState>,
    headers: HeaderMap,
    ValidPath(raw_id): ValidPath<i32>,
) -> Result<Json<BadgeResponse>, AppError> {
    let attendee_id = attendee_id(raw_id)?;
    let badge = state.admission.badge(attendee_id).await?;
    let url = check_in_url(&headers, &state.public_authority, badge.id);

    Ok(Json(BadgeResponse::new(badge, url)))
}

/// `GET /attendees/{attendeeId}/check-in`
pub async fn check_in(
    State(state): State<AttendeesState>,
    ValidPath(raw_id): ValidPath<i32>,
) -> Result<StatusCode, AppError> {
    let attendee_id = attendee_id(raw_id)?;
    state.admission.check_in(attendee_id).await?;
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn non_positive_ids_are_rejected() {
        assert!(attendee_id(1).is_ok());
        assert!(matches!(attendee_id(0), Err(AppError::Validation { .. })));
        assert!(matches!(attendee_id(-3), Err(AppError::Validation { .. })));
    }

    #[test]
    fn url_falls_back_to_configured_authority() {
        let url = check_in_url(&HeaderMap::new(), "localhost:3333", 4);
        assert_eq!(url, "http://localhost:3333/attendees/4/check-in");
    }

    #[test]
    fn url_follows_forwarded_scheme_and_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("passin.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        let url = check_in_url(&headers, "localhost:3333", 12);
        assert_eq!(url, "https://passin.example.com/attendees/12/check-in");
    }

    #[test]
    fn unknown_forwarded_scheme_falls_back_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-proto",
            HeaderValue::from_static("javascript:alert(1)//"),
        );

        let url = check_in_url(&headers, "localhost:3333", 1);
        assert_eq!(url, "http://localhost:3333/attendees/1/check-in");
    }

    #[test]
    fn forwarded_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS"));

        let url = check_in_url(&headers, "localhost:3333", 2);
        assert_eq!(url, "https://localhost:3333/attendees/2/check-in");
    }
}
