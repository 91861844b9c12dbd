//! Router builder for the pass.in HTTP server

use axum::{http::StatusCode, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use passin_kernel::{Module, ModuleRegistry};

use crate::MakeRequestUuidV7;

const API_TITLE: &str = "pass.in";
const API_VERSION: &str = "1.0.0";
const API_DESCRIPTION: &str = "API for the pass.in event registration back-end";

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router at its mount path; `/` merges at the root.
    pub fn mount_module(mut self, mount_path: &str, module_router: Router) -> Self {
        self.router = if mount_path == "/" {
            self.router.merge(module_router)
        } else {
            self.router.nest(mount_path, module_router)
        };
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware. The id is set before tracing sees the
    /// request and echoed back on the response.
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware; expired requests answer 408
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Serve Swagger UI at `/docs` with the OpenAPI document merged from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = openapi_document(registry);

        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "merged OpenAPI document is invalid; serving a bare one");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title(API_TITLE)
                            .version(API_VERSION)
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi_obj),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a module mount path and a module-relative path.
fn public_path(mount_path: &str, path: &str) -> String {
    match mount_path.trim_end_matches('/') {
        "" => path.to_string(),
        prefix => format!("{prefix}{path}"),
    }
}

/// Merge the base document with every module's `paths` and `components.schemas`.
pub fn openapi_document(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "description": API_DESCRIPTION
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "code": { "type": "integer", "description": "HTTP status code" },
            "cause": {
                "type": "array",
                "items": { "type": "object" },
                "description": "Field-level details for validation errors"
            },
            "traceId": { "type": "string" }
        },
        "required": ["message", "code", "traceId"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        merge_module(&mut openapi_spec, module.as_ref());
    }

    openapi_spec
}

fn merge_module(openapi_spec: &mut serde_json::Value, module: &dyn Module) {
    let Some(module_spec) = module.openapi() else {
        return;
    };
    let mount_path = module.mount_path();

    if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
        for (path, path_item) in paths {
            let public = public_path(&mount_path, path);
            // Two modules may contribute different methods on one path.
            match openapi_spec["paths"][&public].as_object_mut() {
                Some(existing) => {
                    if let Some(methods) = path_item.as_object() {
                        for (method, operation) in methods {
                            existing.insert(method.clone(), operation.clone());
                        }
                    }
                }
                None => openapi_spec["paths"][public] = path_item.clone(),
            }
        }
    }

    if let Some(schemas) = module_spec
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(|s| s.as_object())
    {
        for (schema_name, schema_def) in schemas {
            openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
        }
    }
}
