use crate::models::{NoteRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

/// Result of an ownership-checked delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No note with that id; nothing was touched.
    Missing,
    /// The note exists but belongs to someone else; it was left in place.
    NotOwner,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", id))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Notes --

    /// Insert a note and return the stored row with its assigned id.
    pub fn insert_note(&self, content: &str, created_at: &str, user_id: i64) -> Result<NoteRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (content, created_at, user_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![content, created_at, user_id],
            )?;
            Ok(NoteRow {
                id: conn.last_insert_rowid(),
                content: content.to_string(),
                created_at: created_at.to_string(),
                user_id,
            })
        })
    }

    pub fn get_notes_by_user(&self, user_id: i64) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes_by_user(conn, user_id))
    }

    /// Read-only owner lookup for tooling and tests. The delete path does
    /// its own lookup inside [`Database::delete_note_owned_by`].
    pub fn get_note_owner(&self, note_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| query_note_owner(conn, note_id))
    }

    /// Delete a note by id. Deleting an id that does not exist is a no-op.
    pub fn delete_note(&self, note_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
            Ok(())
        })
    }

    /// Delete a note only if `user_id` owns it. The ownership check and the
    /// delete run under the same connection lock.
    pub fn delete_note_owned_by(&self, note_id: i64, user_id: i64) -> Result<DeleteOutcome> {
        self.with_conn(|conn| {
            let outcome = match query_note_owner(conn, note_id)? {
                None => DeleteOutcome::Missing,
                Some(owner) if owner != user_id => DeleteOutcome::NotOwner,
                Some(_) => {
                    conn.execute(
                        "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                        rusqlite::params![note_id, user_id],
                    )?;
                    DeleteOutcome::Deleted
                }
            };
            Ok(outcome)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE id = ?1")?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_notes_by_user(conn: &Connection, user_id: i64) -> Result<Vec<NoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, created_at, user_id
         FROM notes
         WHERE user_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(NoteRow {
                id: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
                user_id: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_note_owner(conn: &Connection, note_id: i64) -> Result<Option<i64>> {
    conn.query_row("SELECT user_id FROM notes WHERE id = ?1", [note_id], |row| row.get(0))
        .optional()
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
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: &str = "2024-05-01T12:00:00+00:00";

    fn db_with_users() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let alice = db.create_user("alice").unwrap().id;
        let bob = db.create_user("bob").unwrap().id;
        (db, alice, bob)
    }

    #[test]
    fn user_lookup_by_username() {
        let (db, alice, _) = db_with_users();
        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(row.id, alice);
        assert_eq!(row.username, "alice");
        assert!(db.get_user_by_username("carol").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let (db, _, _) = db_with_users();
        assert!(db.create_user("alice").is_err());
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let (db, alice, _) = db_with_users();
        let first = db.insert_note("one", T0, alice).unwrap();
        let second = db.insert_note("two", T0, alice).unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.content, "one");
        assert_eq!(first.created_at, T0);
        assert_eq!(first.user_id, alice);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let (db, alice, _) = db_with_users();
        db.insert_note("one", T0, alice).unwrap();
        let second = db.insert_note("two", T0, alice).unwrap();
        db.delete_note(second.id).unwrap();
        let third = db.insert_note("three", T0, alice).unwrap();
        assert!(third.id > second.id);
    }

    #[test]
    fn insert_for_unknown_user_fails() {
        let (db, _, _) = db_with_users();
        assert!(db.insert_note("orphan", T0, 9999).is_err());
    }

    #[test]
    fn list_is_scoped_to_owner() {
        let (db, alice, bob) = db_with_users();
        db.insert_note("a1", T0, alice).unwrap();
        db.insert_note("b1", T0, bob).unwrap();
        db.insert_note("a2", T0, alice).unwrap();

        let notes = db.get_notes_by_user(alice).unwrap();
        let contents: Vec<_> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["a1", "a2"]);
        assert!(notes.iter().all(|n| n.user_id == alice));
    }

    #[test]
    fn list_for_user_without_notes_is_empty() {
        let (db, _, bob) = db_with_users();
        assert!(db.get_notes_by_user(bob).unwrap().is_empty());
    }

    #[test]
    fn delete_twice_is_a_no_op() {
        let (db, alice, _) = db_with_users();
        let note = db.insert_note("gone", T0, alice).unwrap();
        db.delete_note(note.id).unwrap();
        db.delete_note(note.id).unwrap();
        assert!(db.get_notes_by_user(alice).unwrap().is_empty());
        assert_eq!(db.get_note_owner(note.id).unwrap(), None);
    }

    #[test]
    fn owned_delete_outcomes() {
        let (db, alice, bob) = db_with_users();
        let note = db.insert_note("mine", T0, alice).unwrap();

        assert_eq!(db.delete_note_owned_by(note.id, bob).unwrap(), DeleteOutcome::NotOwner);
        assert_eq!(db.get_note_owner(note.id).unwrap(), Some(alice));

        assert_eq!(db.delete_note_owned_by(note.id, alice).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(db.delete_note_owned_by(note.id, alice).unwrap(), DeleteOutcome::Missing);
    }
}
