//! Database row types — these map directly to SQLite rows. Timestamps stay
//! RFC 3339 text here; the API layer parses them into chrono types. Distinct
//! from courier-types models to keep the DB layer independent.

#[derive(Debug)]
pub struct UserRow {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: String,
    pub last_login_at: Option<String>,
}

/// Listing projection: deliberately no phone, digest, or timestamps.
#[derive(Debug)]
pub struct UserSummaryRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug)]
pub struct ProfileRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug)]
pub struct MessageRow {
    pub id: String,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
}

/// One side of a user's message history, with the counterpart's profile
/// joined in.
#[derive(Debug)]
pub struct MessageSideRow {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub counterpart: ProfileRow,
}

/// Full message with both participant profiles.
#[derive(Debug)]
pub struct MessageDetailRow {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub from: ProfileRow,
    pub to: ProfileRow,
}
