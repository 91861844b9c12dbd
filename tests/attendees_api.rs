//! HTTP-level tests for badges, check-in and the ambient endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_bytes, body_json, build_test_app};

// ---------------------------------------------------------------------------
// Badge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn badge_carries_event_and_check_in_url() {
    let app = build_test_app();
    let event_id = app.create_event("Unite Summit", None).await;
    let attendee_id = app.register(&event_id, "Ana", "ana@example.com").await;

    let response = app
        .send(
            Request::get(format!("/attendees/{attendee_id}/badge"))
                .header(header::HOST, "passin.example.com")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let badge = &json["badge"];
    assert_eq!(badge["attendee"]["name"], "Ana");
    assert_eq!(badge["attendee"]["email"], "ana@example.com");
    assert_eq!(badge["attendee"]["event"]["title"], "Unite Summit");
    assert_eq!(badge["attendee"]["event"]["slug"], "unite-summit");
    assert_eq!(
        badge["checkInUrl"],
        format!("https://passin.example.com/attendees/{attendee_id}/check-in")
    );
}

#[tokio::test]
async fn badge_url_defaults_to_configured_authority() {
    let app = build_test_app();
    let event_id = app.create_event("Unite Summit", None).await;
    let attendee_id = app.register(&event_id, "Ana", "ana@example.com").await;

    let json = body_json(app.get(&format!("/attendees/{attendee_id}/badge")).await).await;
    assert_eq!(
        json["badge"]["checkInUrl"],
        format!("http://localhost:3333/attendees/{attendee_id}/check-in")
    );
}

#[tokio::test]
async fn badge_url_ignores_unsupported_forwarded_scheme() {
    let app = build_test_app();
    let event_id = app.create_event("Unite Summit", None).await;
    let attendee_id = app.register(&event_id, "Ana", "ana@example.com").await;

    let response = app
        .send(
            Request::get(format!("/attendees/{attendee_id}/badge"))
                .header("x-forwarded-proto", "javascript:alert(1)//")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["badge"]["checkInUrl"],
        format!("http://localhost:3333/attendees/{attendee_id}/check-in")
    );
}

#[tokio::test]
async fn badge_of_unknown_attendee_is_404() {
    let app = build_test_app();
    let response = app.get("/attendees/999/badge").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Attendee not registered.");
}

#[tokio::test]
async fn non_numeric_attendee_id_is_400() {
    let app = build_test_app();
    let response = app.get("/attendees/abc/badge").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/attendees/0/badge").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Check-in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_check_in_is_rejected() {
    let app = build_test_app();
    let event_id = app.create_event("Unite Summit", None).await;
    let attendee_id = app.register(&event_id, "Ana", "ana@example.com").await;
    let uri = format!("/attendees/{attendee_id}/check-in");

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_bytes(response).await.is_empty());

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Attendee has already checked in."
    );
    assert_eq!(app.store.check_in_count(), 1);
}

#[tokio::test]
async fn check_in_of_unknown_attendee_is_404() {
    let app = build_test_app();
    let response = app.get("/attendees/41/check-in").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.check_in_count(), 0);
}

// ---------------------------------------------------------------------------
// Ambient endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_answers_ok() {
    let app = build_test_app();
    let response = app.get("/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_bytes(response).await, b"ok");
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let app = build_test_app();
    let response = app
        .send(
            Request::get("/healthz")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = build_test_app();
    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "pass.in");
}
