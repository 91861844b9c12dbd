pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use passin_db::schema;
use passin_kernel::{InitCtx, Migration, Module};

use crate::admission::AdmissionController;

/// Event creation, event details and attendee registration/listing.
pub struct EventsModule {
    admission: Arc<AdmissionController>,
}

impl EventsModule {
    pub fn new(admission: Arc<AdmissionController>) -> Self {
        Self { admission }
    }
}

#[async_trait]
impl Module for EventsModule {
    fn name(&self) -> &'static str {
        "events"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = self.admission.store().backend(),
            "events module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/events", post(routes::create_event))
            .route("/events/{event_id}", get(routes::get_event))
            .route(
                "/events/{event_id}/attendees",
                post(routes::register_attendee).get(routes::list_attendees),
            )
            .with_state(self.admission.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = serde_json::json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let event_id = serde_json::json!({
            "name": "eventId",
            "in": "path",
            "required": true,
            "schema": { "type": "string", "format": "uuid" }
        });
        let with_description = |description: &str| {
            let mut response = error.clone();
            response["description"] = description.into();
            response
        };

        Some(serde_json::json!({
            "paths": {
                "/events": {
                    "post": {
                        "summary": "Create an event",
                        "tags": ["Events"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateEvent" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Event created",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "eventId": { "type": "string", "format": "uuid" }
                                            },
                                            "required": ["eventId"]
                                        }
                                    }
                                }
                            },
                            "400": with_description("Invalid body or an event with the same slug exists")
                        }
                    }
                },
                "/events/{eventId}": {
                    "get": {
                        "summary": "Get an event",
                        "tags": ["Events"],
                        "parameters": [event_id.clone()],
                        "responses": {
                            "200": {
                                "description": "Event with its attendee count",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "event": { "$ref": "#/components/schemas/Event" }
                                            },
                                            "required": ["event"]
                                        }
                                    }
                                }
                            },
                            "400": with_description("Invalid event id"),
                            "404": with_description("Event not found")
                        }
                    }
                },
                "/events/{eventId}/attendees": {
                    "post": {
                        "summary": "Register an attendee for an event",
                        "tags": ["Attendees"],
                        "parameters": [event_id.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/RegisterAttendee" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Attendee registered",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "attendeeId": { "type": "integer" }
                                            },
                                            "required": ["attendeeId"]
                                        }
                                    }
                                }
                            },
                            "400": with_description("Invalid body, email already registered or event full"),
                            "404": with_description("Event not found")
                        }
                    },
                    "get": {
                        "summary": "List the attendees of an event",
                        "tags": ["Events"],
                        "parameters": [
                            event_id,
                            {
                                "name": "pageIndex",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "integer", "minimum": 0 }
                            },
                            {
                                "name": "query",
                                "in": "query",
                                "required": false,
                                "description": "Case-insensitive name filter",
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of attendees, newest first",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/AttendeeList" }
                                    }
                                }
                            },
                            "400": with_description("Invalid event id or query parameters")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CreateEvent": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 4 },
                            "details": { "type": ["string", "null"] },
                            "maximumAttendees": { "type": ["integer", "null"], "minimum": 1 }
                        },
                        "required": ["title"]
                    },
                    "Event": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "title": { "type": "string" },
                            "details": { "type": ["string", "null"] },
                            "slug": { "type": "string" },
                            "attendeesAmount": { "type": "integer" },
                            "maximumAttendees": { "type": ["integer", "null"] }
                        },
                        "required": ["id", "title", "slug", "attendeesAmount"]
                    },
                    "RegisterAttendee": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "minLength": 1 },
                            "email": { "type": "string", "format": "email" }
                        },
                        "required": ["name", "email"]
                    },
                    "AttendeeList": {
                        "type": "object",
                        "properties": {
                            "attendees": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "id": { "type": "integer" },
                                        "name": { "type": "string" },
                                        "email": { "type": "string" },
                                        "createdAt": { "type": "string", "format": "date-time" },
                                        "checkInAt": { "type": ["string", "null"], "format": "date-time" }
                                    },
                                    "required": ["id", "name", "email", "createdAt"]
                                }
                            },
                            "quantityPages": { "type": "integer" },
                            "count": { "type": "integer" },
                            "showing": { "type": "integer" }
                        },
                        "required": ["attendees", "quantityPages", "count", "showing"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "0001_create_events",
            up: schema::CREATE_EVENTS,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passin_db::MemoryStore;

    fn module() -> EventsModule {
        let store = Arc::new(MemoryStore::new());
        EventsModule::new(Arc::new(AdmissionController::new(store)))
    }

    #[test]
    fn routes_are_mounted_at_the_root() {
        assert_eq!(module().mount_path(), "/");
    }

    #[test]
    fn openapi_fragment_documents_every_route() {
        let doc = module().openapi().unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths["/events"]["post"].is_object());
        assert!(paths["/events/{eventId}"]["get"].is_object());
        assert!(paths["/events/{eventId}/attendees"]["post"].is_object());
        assert!(paths["/events/{eventId}/attendees"]["get"].is_object());
    }

    #[test]
    fn events_table_migrates_first() {
        let migrations = module().migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].id.starts_with("0001_"));
        assert!(migrations[0].up.contains("uq_events_slug"));
    }
}
