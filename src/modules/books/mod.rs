pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::{DocumentCollection, Store};
use bookshelf_kernel::{settings::Settings, InitCtx, Module};
use serde_json::json;

use models::BookRecord;
use routes::BooksState;

/// CRUD over the books collection, served under `/api/books`.
pub struct BooksModule {
    collection: String,
    state: BooksState,
}

impl BooksModule {
    pub fn new(
        collection: impl Into<String>,
        books: Arc<dyn DocumentCollection<BookRecord>>,
    ) -> Self {
        Self {
            collection: collection.into(),
            state: BooksState { books },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            collection = %self.collection,
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn schema_ref(name: &str) -> serde_json::Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn openapi_fragment() -> serde_json::Value {
    let id_parameter = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "24-character hex book id",
        "schema": { "type": "string" }
    });
    let book_body = json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref("BookInput") } }
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response(
                            "All books, in store order",
                            json!({ "type": "array", "items": schema_ref("Book") }),
                        ),
                        "500": error_response("Store error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body.clone(),
                    "responses": {
                        "200": json_response("Id of the new book", schema_ref("InsertOutcome")),
                        "400": error_response("Malformed body or id"),
                        "500": error_response("Store error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter.clone()],
                    "responses": {
                        "200": json_response("The book", schema_ref("Book")),
                        "400": error_response("Malformed id"),
                        "404": error_response("No book with this id"),
                        "500": error_response("Store error")
                    }
                },
                "put": {
                    "summary": "Replace isbn, title and author of a book",
                    "description": "Fields omitted from the body are overwritten with empty strings. The response is the book as it was before the update.",
                    "tags": ["Books"],
                    "parameters": [id_parameter.clone()],
                    "requestBody": book_body,
                    "responses": {
                        "200": json_response("The book before the update", schema_ref("Book")),
                        "400": error_response("Malformed body or id"),
                        "404": error_response("No book with this id"),
                        "500": error_response("Store error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter],
                    "responses": {
                        "200": json_response(
                            "Number of deleted books; 0 when the id is unknown",
                            schema_ref("DeleteOutcome"),
                        ),
                        "400": error_response("Malformed id"),
                        "500": error_response("Store error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Author": {
                    "type": "object",
                    "properties": {
                        "firstname": { "type": "string" },
                        "lastname": { "type": "string" }
                    }
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "24-character hex id" },
                        "isbn": { "type": "string" },
                        "title": { "type": "string" },
                        "author": schema_ref("Author")
                    },
                    "required": ["id", "isbn", "title", "author"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Optional id, honoured on create only" },
                        "isbn": { "type": "string" },
                        "title": { "type": "string" },
                        "author": schema_ref("Author")
                    }
                },
                "InsertOutcome": {
                    "type": "object",
                    "properties": { "insertedId": { "type": "string" } },
                    "required": ["insertedId"]
                },
                "DeleteOutcome": {
                    "type": "object",
                    "properties": { "deletedCount": { "type": "integer", "minimum": 0 } },
                    "required": ["deletedCount"]
                }
            }
        }
    })
}

/// Build the books module over the configured collection of `store`.
pub fn create_module(store: &Store, settings: &Settings) -> Arc<dyn Module> {
    let collection = &settings.database.books_collection;
    Arc::new(BooksModule::new(
        collection.clone(),
        store.collection::<BookRecord>(collection),
    ))
}
