//! Row-to-model conversions. The store keeps timestamps as RFC 3339 text;
//! everything outward is chrono. A row that fails to parse is a store fault,
//! not a client error.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use courier_db::models::{MessageDetailRow, MessageRow, MessageSideRow, ProfileRow, UserRow};
use courier_types::api::{MessageDetail, Profile, ReceivedMessage, SentMessage};
use courier_types::error::{Error, Result};
use courier_types::models::{Message, User};

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Store(anyhow!("corrupt timestamp '{s}': {e}")))
}

fn parse_ts_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(parse_ts).transpose()
}

fn parse_id(s: &str) -> Result<Uuid> {
    s.parse()
        .map_err(|e| Error::Store(anyhow!("corrupt message id '{s}': {e}")))
}

pub(crate) fn user(row: UserRow) -> Result<User> {
    Ok(User {
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        joined_at: parse_ts(&row.joined_at)?,
        last_login_at: parse_ts_opt(row.last_login_at.as_deref())?,
    })
}

pub(crate) fn profile(row: ProfileRow) -> Profile {
    Profile {
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
    }
}

pub(crate) fn message(row: MessageRow) -> Result<Message> {
    Ok(Message {
        id: parse_id(&row.id)?,
        from_username: row.from_username,
        to_username: row.to_username,
        body: row.body,
        sent_at: parse_ts(&row.sent_at)?,
        read_at: parse_ts_opt(row.read_at.as_deref())?,
    })
}

pub(crate) fn sent_message(row: MessageSideRow) -> Result<SentMessage> {
    Ok(SentMessage {
        id: parse_id(&row.id)?,
        to_user: profile(row.counterpart),
        body: row.body,
        sent_at: parse_ts(&row.sent_at)?,
        read_at: parse_ts_opt(row.read_at.as_deref())?,
    })
}

pub(crate) fn received_message(row: MessageSideRow) -> Result<ReceivedMessage> {
    Ok(ReceivedMessage {
        id: parse_id(&row.id)?,
        from_user: profile(row.counterpart),
        body: row.body,
        sent_at: parse_ts(&row.sent_at)?,
        read_at: parse_ts_opt(row.read_at.as_deref())?,
    })
}

pub(crate) fn message_detail(row: MessageDetailRow) -> Result<MessageDetail> {
    Ok(MessageDetail {
        id: parse_id(&row.id)?,
        from_user: profile(row.from),
        to_user: profile(row.to),
        body: row.body,
        sent_at: parse_ts(&row.sent_at)?,
        read_at: parse_ts_opt(row.read_at.as_deref())?,
    })
}
