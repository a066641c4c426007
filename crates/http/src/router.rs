//! Router builder for the bookshelf HTTP server

use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use bookshelf_kernel::ModuleRegistry;

use crate::error::ErrorResponse;
use crate::openapi;

/// Builder for constructing the main HTTP router.
///
/// Middleware is recorded by the `with_*` methods and applied in [`build`],
/// so it covers every route regardless of call order.
///
/// [`build`]: RouterBuilder::build
pub struct RouterBuilder {
    router: Router,
    tracing: bool,
    cors: bool,
    request_id: bool,
    timeout: Option<Duration>,
    legacy_error_status: bool,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            tracing: false,
            cors: false,
            request_id: false,
            timeout: None,
            legacy_error_status: false,
        }
    }

    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&openapi::module_prefix(module_name), module_router);
        self
    }

    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    /// Tag each request with an `x-request-id` and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.request_id = true;
        self
    }

    /// Abort requests that run longer than `timeout_ms`; `None` waits forever
    pub fn with_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout = timeout_ms.map(Duration::from_millis);
        self
    }

    /// Send error bodies with status 200 when `enabled`
    pub fn with_legacy_error_status(mut self, enabled: bool) -> Self {
        self.legacy_error_status = enabled;
        self
    }

    /// Serve the merged OpenAPI document of all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let document = openapi::build_document(registry);

        #[cfg(feature = "swagger-ui")]
        {
            self.router = self.router.merge(
                utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                    .url("/api-docs/openapi.json", document.clone()),
            );
        }

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(document.clone()) }),
        );
        self
    }

    pub fn build(self) -> Router {
        let mut router = self.router;

        if self.legacy_error_status {
            router = router.layer(middleware::map_response(force_ok_on_error));
        }

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.request_id {
            router = router.layer(PropagateRequestIdLayer::x_request_id());
        }

        if self.tracing {
            router = router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            );
        }

        if self.request_id {
            // Outermost, so the trace span already sees the id.
            router = router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        }

        router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn force_ok_on_error(mut response: Response) -> Response {
    if response.extensions().get::<ErrorResponse>().is_some() {
        *response.status_mut() = StatusCode::OK;
    }
    response
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
