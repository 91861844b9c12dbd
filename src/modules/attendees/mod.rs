pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use passin_db::schema;
use passin_kernel::{InitCtx, Migration, Module};

use crate::admission::AdmissionController;
use routes::AttendeesState;

/// Badge retrieval and check-in.
pub struct AttendeesModule {
    state: AttendeesState,
}

impl AttendeesModule {
    pub fn new(admission: Arc<AdmissionController>, public_authority: impl Into<String>) -> Self {
        Self {
            state: AttendeesState {
                admission,
                public_authority: public_authority.into(),
            },
        }
    }
}

#[async_trait]
impl Module for AttendeesModule {
    fn name(&self) -> &'static str {
        "attendees"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            public_authority = %self.state.public_authority,
            "attendees module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/attendees/{attendee_id}/badge", get(routes::get_badge))
            .route("/attendees/{attendee_id}/check-in", get(routes::check_in))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let attendee_id = serde_json::json!({
            "name": "attendeeId",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "minimum": 1 }
        });
        let error = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(serde_json::json!({
            "paths": {
                "/attendees/{attendeeId}/badge": {
                    "get": {
                        "summary": "Get an attendee badge",
                        "tags": ["Attendees"],
                        "parameters": [attendee_id.clone()],
                        "responses": {
                            "200": {
                                "description": "Badge with the check-in link",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "badge": { "$ref": "#/components/schemas/Badge" }
                                            },
                                            "required": ["badge"]
                                        }
                                    }
                                }
                            },
                            "400": error("Invalid attendee id"),
                            "404": error("Attendee not registered")
                        }
                    }
                },
                "/attendees/{attendeeId}/check-in": {
                    "get": {
                        "summary": "Check an attendee in",
                        "tags": ["Check-ins"],
                        "parameters": [attendee_id],
                        "responses": {
                            "201": { "description": "Checked in" },
                            "400": error("Invalid attendee id or already checked in"),
                            "404": error("Attendee not registered")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Badge": {
                        "type": "object",
                        "properties": {
                            "attendee": {
                                "type": "object",
                                "properties": {
                                    "email": { "type": "string" },
                                    "name": { "type": "string" },
                                    "event": {
                                        "type": "object",
                                        "properties": {
                                            "title": { "type": "string" },
                                            "slug": { "type": "string" }
                                        },
                                        "required": ["title", "slug"]
                                    }
                                },
                                "required": ["email", "name", "event"]
                            },
                            "checkInUrl": { "type": "string", "format": "uri" }
                        },
                        "required": ["attendee", "checkInUrl"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "0002_create_attendees",
                up: schema::CREATE_ATTENDEES,
            },
            Migration {
                id: "0003_create_check_ins",
                up: schema::CREATE_CHECK_INS,
            },
        ]
    }
}
