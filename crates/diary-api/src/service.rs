//! Note operations on behalf of an authenticated caller.
//!
//! Every operation takes the caller as an explicit `Option<&Principal>`;
//! `None` means the request carried no identity at all.

use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::{error, warn};

use diary_db::models::{NoteRow, UserRow};
use diary_db::{Database, DeleteOutcome};
use diary_types::models::{Note, User};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Who may delete a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Only the note's owner; other callers get `Forbidden`.
    #[default]
    Owner,
    /// Any authenticated caller may delete any note by id.
    Permissive,
}

impl FromStr for DeletePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "permissive" => Ok(Self::Permissive),
            other => Err(anyhow::anyhow!(
                "unknown delete policy '{}' (expected 'owner' or 'permissive')",
                other
            )),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("owner"),
            Self::Permissive => f.write_str("permissive"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("request has no authenticated principal")]
    Unauthenticated,
    #[error("no user record for '{0}'")]
    UserNotFound(String),
    #[error("note {0} belongs to another user")]
    Forbidden(i64),
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl NoteError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::UserNotFound(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NoteError> for StatusCode {
    fn from(err: NoteError) -> Self {
        match &err {
            NoteError::Storage(_) => error!("{}", err),
            NoteError::UserNotFound(_) => warn!("{}", err),
            _ => {}
        }
        err.status()
    }
}

pub fn list_notes(db: &Database, principal: Option<&Principal>) -> Result<Vec<Note>, NoteError> {
    let user = resolve_user(db, principal)?;
    let rows = db.get_notes_by_user(user.id)?;
    Ok(rows.into_iter().map(note_from_row).collect())
}

/// Store `content` as a new note owned by the caller, stamped with the
/// server clock. Content is taken as-is.
pub fn create_note(
    db: &Database,
    principal: Option<&Principal>,
    content: &str,
) -> Result<Note, NoteError> {
    let user = resolve_user(db, principal)?;
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let row = db.insert_note(content, &created_at, user.id)?;
    Ok(note_from_row(row))
}

/// Delete a note according to `policy`. A note that does not exist is
/// treated as already deleted under either policy.
pub fn delete_note(
    db: &Database,
    principal: Option<&Principal>,
    note_id: i64,
    policy: DeletePolicy,
) -> Result<(), NoteError> {
    let user = resolve_user(db, principal)?;
    match policy {
        DeletePolicy::Permissive => db.delete_note(note_id)?,
        DeletePolicy::Owner => match db.delete_note_owned_by(note_id, user.id)? {
            DeleteOutcome::Deleted | DeleteOutcome::Missing => {}
            DeleteOutcome::NotOwner => return Err(NoteError::Forbidden(note_id)),
        },
    }
    Ok(())
}

fn resolve_user(db: &Database, principal: Option<&Principal>) -> Result<User, NoteError> {
    let principal = principal.ok_or(NoteError::Unauthenticated)?;
    let row = db
        .get_user_by_username(&principal.username)?
        .ok_or_else(|| NoteError::UserNotFound(principal.username.clone()))?;
    Ok(user_from_row(row))
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
    }
}

fn note_from_row(row: NoteRow) -> Note {
    let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|e| {
        warn!("Corrupt created_at '{}' on note {}: {}", row.created_at, row.id, e);
        DateTime::default()
    });

    Note {
        id: row.id,
        content: row.content,
        created_at,
        user_id: row.user_id,
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        // SQLite's datetime('now') form: "YYYY-MM-DD HH:MM:SS", no timezone.
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}
