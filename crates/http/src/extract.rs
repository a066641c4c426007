//! Request extractors that reject with [`AppError`] instead of plain text.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body, decoded regardless of the `Content-Type` header.
///
/// An empty or malformed body is a [`AppError::BadRequest`]; nothing is
/// replaced by default values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if bytes.is_empty() {
            return Err(AppError::bad_request("request body must be a JSON object"));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::bad_request(format!("invalid JSON body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shelf {
        label: String,
    }

    async fn extract(body: &'static str) -> Result<JsonBody<Shelf>, AppError> {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Shelf>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn decodes_without_content_type() {
        let JsonBody(shelf) = extract(r#"{"label":"fiction"}"#).await.unwrap();
        assert_eq!(shelf, Shelf { label: "fiction".into() });
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let err = extract(r#"{"label":"#).await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON body"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let err = extract("").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }
}
