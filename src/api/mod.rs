//! REST API server module
//!
//! Exposes task submission, the drain barrier, the completion counter and the
//! message store over HTTP, plus an OpenAPI document and an event stream.

use crate::{Config, Dispatcher, MessageStore, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `POST /run/` - Queue `count` copies of a task
/// - `GET /wait/` - Block until every accepted task has finished
/// - `GET /count/` - Completed-total
/// - `GET /stats` - Outstanding, queued and completed counters
///
/// ## Messages
/// - `POST /messages/` - Store a message
/// - `GET /messages/:id` - Get a message (empty id answers 400)
/// - `DELETE /messages/:id` - Delete a message
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(
    dispatcher: Dispatcher,
    store: Arc<MessageStore>,
    config: Arc<Config>,
) -> Router {
    let state = AppState::new(dispatcher, store);

    let router = Router::new()
        // Tasks
        .route("/run/", post(routes::run_tasks))
        .route("/wait/", get(routes::wait_for_tasks))
        .route("/count/", get(routes::task_count))
        .route("/stats", get(routes::dispatch_stats))
        // Messages
        .route(
            "/messages/",
            post(routes::create_message)
                .get(routes::missing_message_id)
                .delete(routes::missing_message_id),
        )
        .route(
            "/messages/:id",
            get(routes::get_message).delete(routes::delete_message),
        )
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.server.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin; otherwise
/// only the listed origins are allowed. Methods and headers are unrestricted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until a termination signal arrives (see [`crate::shutdown_signal`]),
/// then stops accepting connections, lets in-flight requests finish, and
/// shuts the dispatcher down.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use task_dispatch::{Config, Dispatcher, MessageStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let dispatcher = Dispatcher::new((*config).clone()).await?;
/// let store = Arc::new(MessageStore::new());
///
/// // Blocks until SIGTERM/SIGINT
/// task_dispatch::api::start_api_server(dispatcher, store, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    dispatcher: Dispatcher,
    store: Arc<MessageStore>,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(dispatcher.clone(), store, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    serve(listener, app, crate::shutdown_signal()).await?;

    dispatcher.shutdown().await
}

/// Serve `app` on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
