//! Message record handlers.

use super::{parse_json_body, parse_message_id};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{Message, NewMessage};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

/// POST /messages/ - Store a message
#[utoipa::path(
    post,
    path = "/messages/",
    tag = "messages",
    request_body = NewMessage,
    responses(
        (status = 201, description = "Message stored", body = Message),
        (status = 400, description = "Malformed request body", body = crate::error::ApiError)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Message>)> {
    let new: NewMessage = parse_json_body(&body)?;
    let message = state.store.create(new).await;

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/:id - Get a message
#[utoipa::path(
    get,
    path = "/messages/{id}",
    tag = "messages",
    params(
        ("id" = i64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message found", body = Message),
        (status = 400, description = "Non-integer id", body = crate::error::ApiError),
        (status = 404, description = "Message not found", body = crate::error::ApiError)
    )
)]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>> {
    let id = parse_message_id(&id)?;

    state
        .store
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("message {id}")))
}

/// DELETE /messages/:id - Delete a message
#[utoipa::path(
    delete,
    path = "/messages/{id}",
    tag = "messages",
    params(
        ("id" = i64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message deleted (empty body)"),
        (status = 400, description = "Non-integer id", body = crate::error::ApiError),
        (status = 404, description = "Message not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_message_id(&id)?;

    match state.store.delete(id).await {
        Some(_) => Ok(StatusCode::OK),
        None => Err(Error::NotFound(format!("message {id}"))),
    }
}

/// GET/DELETE /messages/ - Id segment left empty
pub async fn missing_message_id() -> Result<StatusCode> {
    parse_message_id("").map(|_| StatusCode::OK)
}
