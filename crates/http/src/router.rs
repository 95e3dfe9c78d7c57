//! Router builder for the bookshelf HTTP server

use axum::{error_handling::HandleErrorLayer, BoxError, Router};
use std::time::Duration;
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::AppError, MakeRequestUuid};

/// Path of the generated OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Path of the Swagger UI
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Builder for constructing the main HTTP router
///
/// Layers only wrap routes that exist when they are added, so mount every
/// module before calling the `with_*` middleware methods.
pub struct RouterBuilder {
    router: OpenApiRouter,
}

impl RouterBuilder {
    /// Create a new router builder whose OpenAPI document carries the given title
    pub fn new(title: &str, description: &str) -> Self {
        let api = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title(title)
                    .version(env!("CARGO_PKG_VERSION"))
                    .description(Some(description))
                    .build(),
            )
            .build();

        Self {
            router: OpenApiRouter::with_openapi(api),
        }
    }

    /// Add an undocumented route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's documented routes at the server root
    pub fn mount_module(mut self, module_router: OpenApiRouter) -> Self {
        self.router = self.router.merge(module_router);
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

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware; an expired request gets a 408 `{message}` body
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(middleware_error))
                .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms))),
        );
        self
    }

    /// Build the final router, serving the collected OpenAPI document and
    /// the Swagger UI next to the application routes
    pub fn build(self) -> Router {
        let (router, api) = self.router.split_for_parts();
        router.merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, api))
    }
}

async fn middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::timeout("Request timed out")
    } else {
        AppError::internal("Server error", anyhow::anyhow!(err))
    }
}
