//! Book resource handlers. Each issues exactly one collection operation.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use bookshelf_db::{DocumentCollection, Filter, ObjectId};
use bookshelf_http::{error::AppError, extract::JsonBody};
use futures::TryStreamExt;

use super::models::{parse_id, Book, BookInput, BookRecord, DeleteOutcome, InsertOutcome};

/// State shared by the book handlers.
#[derive(Clone)]
pub struct BooksState {
    pub books: Arc<dyn DocumentCollection<BookRecord>>,
}

/// Book id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct BookId(pub ObjectId);

impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        parse_id(&raw).map(BookId)
    }
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(state)
}

fn not_found(id: ObjectId) -> AppError {
    AppError::not_found(format!("book {} not found", id))
}

/// Every book, in the order the store returns them. A document that fails
/// to decode fails this request only.
async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    let books: Vec<Book> = state
        .books
        .find(Filter::All)
        .await?
        .map_ok(Book::from)
        .try_collect()
        .await?;

    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(books))
}

async fn get_book(
    State(state): State<BooksState>,
    BookId(id): BookId,
) -> Result<Json<Book>, AppError> {
    let record = state
        .books
        .find_one(Filter::Id(id))
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(record.into()))
}

async fn create_book(
    State(state): State<BooksState>,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<InsertOutcome>, AppError> {
    let record = input.into_record()?;
    let id = state.books.insert_one(&record).await?;

    tracing::info!(book_id = %id, "book created");
    Ok(Json(InsertOutcome {
        inserted_id: id.to_hex(),
    }))
}

/// Replaces `isbn`, `title` and `author`, then responds with the book as it
/// was before the update, carrying the id from the path.
async fn update_book(
    State(state): State<BooksState>,
    BookId(id): BookId,
    JsonBody(input): JsonBody<BookInput>,
) -> Result<Json<Book>, AppError> {
    let previous = state
        .books
        .find_one_and_update(Filter::Id(id), input.into_update())
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(book_id = %id, "book updated");
    Ok(Json(Book {
        id: id.to_hex(),
        ..Book::from(previous)
    }))
}

/// Deleting an unknown id is not an error; it reports zero deletions.
async fn delete_book(
    State(state): State<BooksState>,
    BookId(id): BookId,
) -> Result<Json<DeleteOutcome>, AppError> {
    let deleted_count = state.books.delete_one(Filter::Id(id)).await?;

    tracing::info!(book_id = %id, deleted_count, "book delete processed");
    Ok(Json(DeleteOutcome { deleted_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bookshelf_db::memory::InMemoryStore;
    use tower::ServiceExt;

    fn app() -> (Router, InMemoryStore) {
        let store = InMemoryStore::new();
        let state = BooksState {
            books: Arc::new(store.collection::<BookRecord>("books")),
        };
        (router(state), store)
    }

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn empty_collection_lists_as_empty_array() {
        let (router, _) = app();
        let (status, body) = send(router, "GET", "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_path_id_is_bad_request() {
        let (router, _) = app();
        for method in ["GET", "PUT", "DELETE"] {
            let (status, body) = send(router.clone(), method, "/not-a-hex-id", "{}").await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} /not-a-hex-id", method);
            assert_eq!(body["error"]["code"], "bad_request");
        }
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_touching_the_store() {
        let (router, store) = app();
        let (status, _) = send(router, "POST", "/", "{\"title\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.collection::<BookRecord>("books").is_empty().await);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let (router, _) = app();
        let uri = format!("/{}", ObjectId::new().to_hex());
        let (status, body) = send(router, "PUT", &uri, r#"{"title":"Dune"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }
}
