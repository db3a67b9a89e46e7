use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use courier_auth::guard;
use courier_types::api::{CreateMessageRequest, MessageDetail};
use courier_types::error::Error;
use courier_types::models::{Message, Principal};

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

pub async fn create_message(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.is_empty() {
        return Err(Error::Validation("body must not be empty".into()).into());
    }

    let id = Uuid::new_v4();

    // The sender is always the principal; the request cannot name one.
    let db = state.clone();
    let from = principal.username;
    let row = tokio::task::spawn_blocking(move || {
        db.db
            .insert_message(&id.to_string(), &from, &req.to_username, &req.body)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        Error::store(e)
    })??;

    Ok((StatusCode::CREATED, Json(convert::message(row)?)))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MessageDetail>, ApiError> {
    let row = state
        .db
        .get_message(&id.to_string())?
        .ok_or(Error::NotFound)?;

    // Either participant may read: sender or recipient.
    guard::require_participant(&principal, &row.from.username, &row.to.username)?;

    Ok(Json(convert::message_detail(row)?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Message>, ApiError> {
    let row = state
        .db
        .get_message(&id.to_string())?
        .ok_or(Error::NotFound)?;

    guard::require_recipient(&principal, &row.to.username)?;

    // Participants are immutable, so the gate above cannot race the CAS.
    let updated = state.db.mark_read(&id.to_string())?;
    Ok(Json(convert::message(updated)?))
}
