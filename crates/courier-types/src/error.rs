use thiserror::Error;

/// Failure kinds shared by every layer of the backend. The API layer maps
/// each kind to a status code; nothing below it knows about HTTP.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate registration — the username is already taken.
    #[error("already exists")]
    Conflict,

    /// Unknown user or message id.
    #[error("not found")]
    NotFound,

    /// No valid principal on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal is authenticated but does not own the resource.
    #[error("access denied")]
    Forbidden,

    /// Bad signature, malformed token, or a missing identity claim.
    #[error("invalid token")]
    InvalidToken,

    /// Malformed input, e.g. an empty required field.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Infrastructure fault: store unreachable, corrupt row, hasher failure.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    pub fn store(e: impl Into<anyhow::Error>) -> Self {
        Error::Store(e.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
