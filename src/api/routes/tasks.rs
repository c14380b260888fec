//! Task submission, drain and counter handlers.

use super::parse_json_body;
use crate::api::AppState;
use crate::error::Result;
use crate::types::{CountResponse, DispatchStats, RunRequest, StatusResponse};
use axum::{Json, body::Bytes, extract::State, http::StatusCode};

/// POST /run/ - Queue `count` copies of a task
///
/// Under the block policy the response is held back until every copy has a
/// queue slot, so a slow pool throttles the caller.
#[utoipa::path(
    post,
    path = "/run/",
    tag = "tasks",
    request_body = RunRequest,
    responses(
        (status = 202, description = "Tasks queued", body = StatusResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ApiError),
        (status = 503, description = "Queue full (reject policy) or shutting down", body = crate::error::ApiError)
    )
)]
pub async fn run_tasks(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusResponse>)> {
    let request: RunRequest = parse_json_body(&body)?;

    state
        .dispatcher
        .submit(&request.task, request.count)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(StatusResponse::new("tasks queued")),
    ))
}

/// GET /wait/ - Block until every accepted task has finished
#[utoipa::path(
    get,
    path = "/wait/",
    tag = "tasks",
    responses(
        (status = 200, description = "Outstanding work reached zero", body = StatusResponse)
    )
)]
pub async fn wait_for_tasks(State(state): State<AppState>) -> Json<StatusResponse> {
    let completed = state.dispatcher.wait().await;
    tracing::info!(completed, "All tasks completed");

    Json(StatusResponse::new("all tasks completed"))
}

/// GET /count/ - Completed-total
#[utoipa::path(
    get,
    path = "/count/",
    tag = "tasks",
    responses(
        (status = 200, description = "Number of tasks finished since startup", body = CountResponse)
    )
)]
pub async fn task_count(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        task_counter: state.dispatcher.completed_total(),
    })
}

/// GET /stats - Dispatcher counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "tasks",
    responses(
        (status = 200, description = "Current dispatcher counters", body = DispatchStats)
    )
)]
pub async fn dispatch_stats(State(state): State<AppState>) -> Json<DispatchStats> {
    Json(state.dispatcher.stats())
}
