use chrono::Utc;
use rusqlite::{Connection, ErrorCode};

use courier_types::error::{Error, Result};

use crate::Database;
use crate::models::{
    MessageDetailRow, MessageRow, MessageSideRow, ProfileRow, UserRow, UserSummaryRow,
};

impl Database {
    // -- Users --

    /// Insert a new user. The UNIQUE primary key makes duplicate detection
    /// atomic: a second registration for the same username fails with
    /// `Conflict` and leaves the first row untouched.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            let joined_at = Utc::now().to_rfc3339();
            match conn.execute(
                "INSERT INTO users (username, password, first_name, last_name, phone, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![username, password_hash, first_name, last_name, phone, joined_at],
            ) {
                Ok(_) => Ok(UserRow {
                    username: username.to_string(),
                    password: password_hash.to_string(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    phone: phone.to_string(),
                    joined_at,
                    last_login_at: None,
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(Error::Conflict)
                }
                Err(e) => Err(Error::store(e)),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn list_users(&self) -> Result<Vec<UserSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT username, first_name, last_name FROM users ORDER BY username")
                .map_err(Error::store)?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(UserSummaryRow {
                        username: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                    })
                })
                .map_err(Error::store)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Error::store)?;

            Ok(rows)
        })
    }

    /// Record a successful login. One conditional UPDATE keyed by username;
    /// returns the new timestamp.
    pub fn touch_last_login(&self, username: &str) -> Result<String> {
        self.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let updated = conn
                .execute(
                    "UPDATE users SET last_login_at = ?2 WHERE username = ?1",
                    rusqlite::params![username, now],
                )
                .map_err(Error::store)?;

            if updated == 0 {
                Err(Error::NotFound)
            } else {
                Ok(now)
            }
        })
    }

    // -- Messages --

    /// Insert a message from an authenticated sender. The recipient is
    /// checked and the row inserted under one connection lock; the foreign
    /// key constraint is the backstop.
    pub fn insert_message(&self, id: &str, from: &str, to: &str, body: &str) -> Result<MessageRow> {
        self.with_conn(|conn| {
            let recipient: Option<String> = conn
                .query_row("SELECT username FROM users WHERE username = ?1", [to], |row| {
                    row.get(0)
                })
                .optional()?;
            if recipient.is_none() {
                return Err(Error::NotFound);
            }

            let sent_at = Utc::now().to_rfc3339();
            match conn.execute(
                "INSERT INTO messages (id, from_username, to_username, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, from, to, body, sent_at],
            ) {
                Ok(_) => Ok(MessageRow {
                    id: id.to_string(),
                    from_username: from.to_string(),
                    to_username: to.to_string(),
                    body: body.to_string(),
                    sent_at,
                    read_at: None,
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(Error::NotFound)
                }
                Err(e) => Err(Error::store(e)),
            }
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageDetailRow>> {
        self.with_conn(|conn| query_message_detail(conn, id))
    }

    /// Set `read_at` if and only if it is currently NULL, then return the
    /// row. Compare-and-set: a repeat call (or the loser of a concurrent
    /// race) leaves the stored timestamp untouched and reads it back.
    pub fn mark_read(&self, id: &str) -> Result<MessageRow> {
        self.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "UPDATE messages SET read_at = ?2 WHERE id = ?1 AND read_at IS NULL",
                rusqlite::params![id, now],
            )
            .map_err(Error::store)?;

            query_message(conn, id)?.ok_or(Error::NotFound)
        })
    }

    /// Messages sent by `username`, insertion-ordered, with the recipient's
    /// profile joined in.
    pub fn messages_from(&self, username: &str) -> Result<Vec<MessageSideRow>> {
        self.with_conn(|conn| {
            query_message_side(conn, username, "m.from_username", "m.to_username")
        })
    }

    /// Messages received by `username`, insertion-ordered, with the sender's
    /// profile joined in.
    pub fn messages_to(&self, username: &str) -> Result<Vec<MessageSideRow>> {
        self.with_conn(|conn| {
            query_message_side(conn, username, "m.to_username", "m.from_username")
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT username, password, first_name, last_name, phone, joined_at, last_login_at
             FROM users WHERE username = ?1",
        )
        .map_err(Error::store)?;

    stmt.query_row([username], |row| {
        Ok(UserRow {
            username: row.get(0)?,
            password: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            phone: row.get(4)?,
            joined_at: row.get(5)?,
            last_login_at: row.get(6)?,
        })
    })
    .optional()
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, from_username, to_username, body, sent_at, read_at
             FROM messages WHERE id = ?1",
        )
        .map_err(Error::store)?;

    stmt.query_row([id], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            from_username: row.get(1)?,
            to_username: row.get(2)?,
            body: row.get(3)?,
            sent_at: row.get(4)?,
            read_at: row.get(5)?,
        })
    })
    .optional()
}

fn query_message_detail(conn: &Connection, id: &str) -> Result<Option<MessageDetailRow>> {
    // JOIN both participants in a single query
    let mut stmt = conn
        .prepare(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    f.username, f.first_name, f.last_name, f.phone,
                    t.username, t.first_name, t.last_name, t.phone
             FROM messages m
                    JOIN users f ON m.from_username = f.username
                    JOIN users t ON m.to_username = t.username
             WHERE m.id = ?1",
        )
        .map_err(Error::store)?;

    stmt.query_row([id], |row| {
        Ok(MessageDetailRow {
            id: row.get(0)?,
            body: row.get(1)?,
            sent_at: row.get(2)?,
            read_at: row.get(3)?,
            from: ProfileRow {
                username: row.get(4)?,
                first_name: row.get(5)?,
                last_name: row.get(6)?,
                phone: row.get(7)?,
            },
            to: ProfileRow {
                username: row.get(8)?,
                first_name: row.get(9)?,
                last_name: row.get(10)?,
                phone: row.get(11)?,
            },
        })
    })
    .optional()
}

fn query_message_side(
    conn: &Connection,
    username: &str,
    side_col: &str,
    counterpart_col: &str,
) -> Result<Vec<MessageSideRow>> {
    // Column names come from the two callers above, never from input.
    let sql = format!(
        "SELECT m.id, m.body, m.sent_at, m.read_at,
                u.username, u.first_name, u.last_name, u.phone
         FROM messages m
                JOIN users u ON {counterpart_col} = u.username
         WHERE {side_col} = ?1
         ORDER BY m.rowid",
    );

    let mut stmt = conn.prepare(&sql).map_err(Error::store)?;

    let rows = stmt
        .query_map([username], |row| {
            Ok(MessageSideRow {
                id: row.get(0)?,
                body: row.get(1)?,
                sent_at: row.get(2)?,
                read_at: row.get(3)?,
                counterpart: ProfileRow {
                    username: row.get(4)?,
                    first_name: row.get(5)?,
                    last_name: row.get(6)?,
                    phone: row.get(7)?,
                },
            })
        })
        .map_err(Error::store)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::store)?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::store(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn store_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("alice", "digest-a", "Alice", "Archer", "555-0100")
            .unwrap();
        db.create_user("bob", "digest-b", "Bob", "Barker", "555-0101")
            .unwrap();
        db
    }

    #[test]
    fn duplicate_username_conflicts_and_keeps_first_row() {
        let db = store_with_users();

        let err = db
            .create_user("alice", "digest-x", "Other", "Person", "555-9999")
            .unwrap_err();
        assert!(matches!(err, Error::Conflict));

        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(row.password, "digest-a");
        assert_eq!(row.first_name, "Alice");
    }

    #[test]
    fn listing_is_ordered_and_minimal() {
        let db = store_with_users();

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[1].username, "bob");
    }

    #[test]
    fn touch_last_login() {
        let db = store_with_users();
        assert!(db.get_user_by_username("alice").unwrap().unwrap().last_login_at.is_none());

        let ts = db.touch_last_login("alice").unwrap();
        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(row.last_login_at.as_deref(), Some(ts.as_str()));

        assert!(matches!(db.touch_last_login("nobody"), Err(Error::NotFound)));
    }

    #[test]
    fn insert_message_requires_known_recipient() {
        let db = store_with_users();

        let msg = db.insert_message("m1", "alice", "bob", "hi").unwrap();
        assert_eq!(msg.from_username, "alice");
        assert!(msg.read_at.is_none());

        assert!(matches!(
            db.insert_message("m2", "alice", "nobody", "hi"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn message_detail_joins_both_profiles() {
        let db = store_with_users();
        db.insert_message("m1", "alice", "bob", "hi").unwrap();

        let detail = db.get_message("m1").unwrap().unwrap();
        assert_eq!(detail.from.username, "alice");
        assert_eq!(detail.to.username, "bob");
        assert_eq!(detail.to.phone, "555-0101");
        assert_eq!(detail.body, "hi");

        assert!(db.get_message("missing").unwrap().is_none());
    }

    #[test]
    fn mark_read_sets_once_and_is_idempotent() {
        let db = store_with_users();
        db.insert_message("m1", "alice", "bob", "hi").unwrap();

        let first = db.mark_read("m1").unwrap();
        let read_at = first.read_at.expect("read_at set");

        // Second call must not overwrite the stored timestamp.
        let second = db.mark_read("m1").unwrap();
        assert_eq!(second.read_at.as_deref(), Some(read_at.as_str()));

        assert!(matches!(db.mark_read("missing"), Err(Error::NotFound)));
    }

    #[test]
    fn racing_mark_read_calls_agree_on_one_timestamp() {
        let db = store_with_users();
        db.insert_message("m1", "alice", "bob", "hi").unwrap();

        // Whoever wins the compare-and-set, everyone reads back its value.
        let timestamps: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| db.mark_read("m1").unwrap().read_at.unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(timestamps.len(), 4);
        assert!(timestamps.iter().all(|t| t == &timestamps[0]));
    }

    #[test]
    fn message_sides_embed_counterpart_in_insertion_order() {
        let db = store_with_users();
        db.insert_message("m1", "alice", "bob", "first").unwrap();
        db.insert_message("m2", "alice", "bob", "second").unwrap();
        db.insert_message("m3", "bob", "alice", "reply").unwrap();

        let from_alice = db.messages_from("alice").unwrap();
        assert_eq!(from_alice.len(), 2);
        assert_eq!(from_alice[0].body, "first");
        assert_eq!(from_alice[1].body, "second");
        assert_eq!(from_alice[0].counterpart.username, "bob");

        let to_alice = db.messages_to("alice").unwrap();
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].body, "reply");
        assert_eq!(to_alice[0].counterpart.username, "bob");
        assert_eq!(to_alice[0].counterpart.first_name, "Bob");
    }
}
