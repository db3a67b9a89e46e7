use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::error;

use courier_auth::guard;
use courier_types::api::{ReceivedMessage, SentMessage, UserSummary};
use courier_types::error::Error;
use courier_types::models::{Principal, User};

use crate::auth::AppState;
use crate::convert;
use crate::error::ApiError;

/// Listing requires authentication only; the projection carries nothing
/// sensitive.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let rows = state.db.list_users()?;

    let users = rows
        .into_iter()
        .map(|r| UserSummary {
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
        })
        .collect();

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<User>, ApiError> {
    guard::require_owner(&principal, &username)?;

    let row = state
        .db
        .get_user_by_username(&username)?
        .ok_or(Error::NotFound)?;

    Ok(Json(convert::user(row)?))
}

pub async fn messages_to(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<ReceivedMessage>>, ApiError> {
    guard::require_owner(&principal, &username)?;

    // Run the blocking DB query off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.messages_to(&username))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            Error::store(e)
        })??;

    let messages = rows
        .into_iter()
        .map(convert::received_message)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(messages))
}

pub async fn messages_from(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<SentMessage>>, ApiError> {
    guard::require_owner(&principal, &username)?;

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.messages_from(&username))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            Error::store(e)
        })??;

    let messages = rows
        .into_iter()
        .map(convert::sent_message)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(messages))
}
