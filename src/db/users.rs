use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::models::User;
use super::now_timestamp;

/// Which unique column a failed insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taken {
    Email,
    Username,
    Either,
}

impl Taken {
    pub fn message(&self) -> &'static str {
        match self {
            Taken::Email => "Email already taken",
            Taken::Username => "Username already taken",
            Taken::Either => "Email or username already taken",
        }
    }
}

/// Maps a uniqueness violation on `users` to the column that was taken.
/// Any other error returns `None` and should be treated as a store failure.
pub fn taken_column(err: &rusqlite::Error) -> Option<Taken> {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            let msg = msg.as_deref().unwrap_or_default();
            if msg.contains("users.email") {
                Some(Taken::Email)
            } else if msg.contains("users.username") {
                Some(Taken::Username)
            } else {
                Some(Taken::Either)
            }
        }
        _ => None,
    }
}

pub fn create_user(
    conn: &Connection,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO users (email, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![email, username, password_hash, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, email, username, password_hash, created_at FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

/// Removes a user. Foreign-key cascades take their posts, comments,
/// reactions, sessions and post-category pairings with them.
pub fn delete_user(conn: &Connection, user_id: i64) -> Result<bool, rusqlite::Error> {
    let removed = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    Ok(removed > 0)
}
