/// Database row types — these map directly to SQLite rows.
/// Distinct from diary-types models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

pub struct NoteRow {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user_id: i64,
}
