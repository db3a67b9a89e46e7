use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use courier_types::error::Error;

use crate::auth::AppState;
use crate::error::ApiError;

/// Extract and verify the bearer token, then attach the principal as a
/// request extension. A missing or malformed header is `Unauthenticated`;
/// a bad token surfaces as `InvalidToken` from the token service. Whether
/// the claimed user still exists is checked by the store when handlers use
/// the principal.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(Error::Unauthenticated)?;

    let principal = state.tokens.verify(token)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
