#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use passin_db::MemoryStore;
use passin_kernel::settings::Settings;
use tower::ServiceExt;

/// Full application over an in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let router = passin_app::bootstrap::build_app(store.clone(), &Settings::default())
        .expect("application builds");
    TestApp { router, store }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Create an event and return its id.
    pub async fn create_event(&self, title: &str, maximum_attendees: Option<i32>) -> String {
        let response = self
            .post_json(
                "/events",
                serde_json::json!({
                    "title": title,
                    "details": null,
                    "maximumAttendees": maximum_attendees,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["eventId"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register an attendee and return its id.
    pub async fn register(&self, event_id: &str, name: &str, email: &str) -> i64 {
        let response = self
            .post_json(
                &format!("/events/{event_id}/attendees"),
                serde_json::json!({ "name": name, "email": email }),
            )
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["attendeeId"].as_i64().unwrap()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
