//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the task-dispatch REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the task-dispatch REST API
///
/// The document can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "task-dispatch REST API",
        version = "0.1.0",
        description = "Queue batches of fetch-and-sleep tasks, wait for them to drain, and keep simple message records",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Tasks
        crate::api::routes::run_tasks,
        crate::api::routes::wait_for_tasks,
        crate::api::routes::task_count,
        crate::api::routes::dispatch_stats,

        // Messages
        crate::api::routes::create_message,
        crate::api::routes::get_message,
        crate::api::routes::delete_message,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::Task,
        crate::types::RunRequest,
        crate::types::StatusResponse,
        crate::types::CountResponse,
        crate::types::DispatchStats,
        crate::types::MessageId,
        crate::types::Message,
        crate::types::NewMessage,
        crate::types::Event,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Task dispatch - Queue tasks, wait for the drain, read counters"),
        (name = "messages", description = "Message records - Create, read and delete"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
