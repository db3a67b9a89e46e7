use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use courier_auth::{CredentialStore, TokenService};
use courier_db::Database;
use courier_types::api::{LoginRequest, RegisterRequest, TokenResponse};
use courier_types::error::{Error, Result};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub credentials: CredentialStore,
    pub tokens: TokenService,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.username.len() > 32 {
        return Err(Error::Validation("username must be 1-32 characters".into()).into());
    }
    if req.password.is_empty() {
        return Err(Error::Validation("password must not be empty".into()).into());
    }

    // Only the digest is stored; the plaintext goes no further than this.
    let digest = state.credentials.hash(&req.password)?;

    let user = state.db.create_user(
        &req.username,
        &digest,
        &req.first_name,
        &req.last_name,
        &req.phone,
    )?;

    info!("registered user {}", user.username);

    let token = state.tokens.issue(&user.username)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // An unknown username and a wrong password must be indistinguishable
    // to the caller, so the lookup miss collapses into the same rejection.
    let ok = match verify_credentials(&state, &req.username, &req.password) {
        Ok(ok) => ok,
        Err(Error::NotFound) => false,
        Err(e) => return Err(e.into()),
    };
    if !ok {
        return Err(Error::Unauthenticated.into());
    }

    state.db.touch_last_login(&req.username)?;
    info!("user {} logged in", req.username);

    let token = state.tokens.issue(&req.username)?;
    Ok(Json(TokenResponse { token }))
}

/// Look the user up and check the candidate password against the stored
/// digest. An absent user is `NotFound`; a wrong password is `Ok(false)`,
/// never an error.
pub fn verify_credentials(state: &AppStateInner, username: &str, password: &str) -> Result<bool> {
    let user = state
        .db
        .get_user_by_username(username)?
        .ok_or(Error::NotFound)?;
    state.credentials.verify(password, &user.password)
}
