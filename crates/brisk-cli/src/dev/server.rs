//! HTTP glue around the transform dispatcher.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::dev::{SharedContext, Transformed, transform_request};
use crate::error::{CliError, Result};

/// Development server.
pub struct DevServer {
    addr: SocketAddr,
    context: SharedContext,
}

impl DevServer {
    pub fn new(addr: SocketAddr, context: SharedContext) -> Self {
        Self { addr, context }
    }

    /// Bind and serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Server`] if the address cannot be bound or the
    /// server stops with an I/O error.
    pub async fn start(self) -> Result<()> {
        let app = build_router(self.context);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {e}", self.addr)))?;
        tracing::debug!(addr = %self.addr, "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Build the router: transform middleware in front of the static file
/// service for the project root.
pub fn build_router(context: SharedContext) -> Router {
    let static_files = ServeDir::new(context.root());

    Router::new()
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(context, transform_middleware))
        .layer(
            // Allow all origins in development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Answer with a transformed body, or hand the request to the next service.
async fn transform_middleware(
    State(context): State<SharedContext>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let started = Instant::now();

    match transform_request(&context, &path).await {
        Ok(Some(transformed)) => {
            tracing::debug!(
                path = %path,
                content_type = transformed.content_type,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "transformed"
            );
            transformed_response(transformed)
        }
        Ok(None) => next.run(request).await,
        Err(e) if e.is_not_found() => {
            tracing::debug!(path = %path, "not found, passing through");
            next.run(request).await
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "transform failed");
            (e.status(), [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], e.to_string())
                .into_response()
        }
    }
}

fn transformed_response(transformed: Transformed) -> Response {
    let mut response = Response::new(Body::from(transformed.body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(transformed.content_type),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    crate::ui::info("Shutting down development server...");
}
