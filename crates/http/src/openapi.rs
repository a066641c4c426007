//! Merges module OpenAPI fragments into one document.

use serde_json::{json, Value};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

use bookshelf_kernel::ModuleRegistry;

const TITLE: &str = "Bookshelf API";
const VERSION: &str = "1.0.0";

/// URL prefix a module's routes are mounted under.
pub fn module_prefix(module_name: &str) -> String {
    format!("/api/{}", module_name)
}

/// Full path of a module-relative route, without a trailing slash for `/`.
fn prefixed_path(module_name: &str, path: &str) -> String {
    match path {
        "" | "/" => module_prefix(module_name),
        path => format!("{}{}", module_prefix(module_name), path),
    }
}

/// Merge every module's fragment into a single OpenAPI 3 JSON document.
pub fn merge_fragments(registry: &ModuleRegistry) -> Value {
    let mut spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": TITLE,
            "version": VERSION,
            "description": "CRUD API over the books collection"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Liveness check",
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "message": { "type": "string" },
                                "details": { "type": "array", "items": { "type": "object" } },
                                "trace_id": { "type": "string" },
                                "timestamp": { "type": "string" }
                            },
                            "required": ["code", "message", "trace_id", "timestamp"]
                        }
                    },
                    "required": ["error"]
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                spec["paths"][prefixed_path(module.name(), path)] = item.clone();
            }
        }

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                spec["components"]["schemas"][name] = schema.clone();
            }
        }
    }

    spec
}

/// Typed OpenAPI document; falls back to a bare document if a fragment is invalid.
pub fn build_document(registry: &ModuleRegistry) -> OpenApi {
    serde_json::from_value(merge_fragments(registry)).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "module OpenAPI fragments are invalid; serving a bare document");
        OpenApiBuilder::new()
            .info(InfoBuilder::new().title(TITLE).version(VERSION).build())
            .build()
    })
}
