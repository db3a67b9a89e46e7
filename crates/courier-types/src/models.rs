use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as the rest of the system sees one.
/// The password digest never leaves the store layer, so it is not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// A direct message between two users. Participants are fixed at creation;
/// only `read_at` ever changes, and only once (None -> timestamp).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// The authenticated identity for one in-flight request, derived from a
/// verified token. Carried as a request extension by the auth middleware.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
}
