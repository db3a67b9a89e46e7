use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// -- Users --

/// Minimal projection for the user listing: no phone, no timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Counterpart profile embedded in message listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

// -- Messages --

/// Sender field is deliberately absent: it always comes from the principal.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// One entry of `GET /users/{username}/from`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: Uuid,
    pub to_user: Profile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// One entry of `GET /users/{username}/to`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub id: Uuid,
    pub from_user: Profile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Full message with both participant profiles, for `GET /messages/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: Uuid,
    pub from_user: Profile,
    pub to_user: Profile,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
