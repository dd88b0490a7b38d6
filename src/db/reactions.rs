use rusqlite::{params, Connection, OptionalExtension};

use super::models::{ReactionValue, TargetKind};
use super::{comments, now_timestamp, posts};

/// Records a user's reaction, replacing value and timestamp of any earlier
/// reaction on the same target. One statement, so no intermediate state is visible.
pub fn upsert_reaction(
    conn: &Connection,
    user_id: i64,
    kind: TargetKind,
    target_id: i64,
    value: ReactionValue,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO reactions (user_id, target_type, target_id, value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (user_id, target_type, target_id)
         DO UPDATE SET value = excluded.value, created_at = excluded.created_at",
        params![user_id, kind.as_str(), target_id, value.as_i64(), now_timestamp()],
    )?;
    Ok(())
}

/// `(likes, dislikes)` for a target.
pub fn tally(
    conn: &Connection,
    kind: TargetKind,
    target_id: i64,
) -> Result<(i64, i64), rusqlite::Error> {
    conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN value = 1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN value = -1 THEN 1 ELSE 0 END), 0)
         FROM reactions WHERE target_type = ?1 AND target_id = ?2",
        params![kind.as_str(), target_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

pub fn user_reaction(
    conn: &Connection,
    user_id: i64,
    kind: TargetKind,
    target_id: i64,
) -> Result<Option<ReactionValue>, rusqlite::Error> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT value FROM reactions WHERE user_id = ?1 AND target_type = ?2 AND target_id = ?3",
            params![user_id, kind.as_str(), target_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.map(|v| {
        if v == 1 {
            ReactionValue::Like
        } else {
            ReactionValue::Dislike
        }
    }))
}

pub fn target_exists(
    conn: &Connection,
    kind: TargetKind,
    target_id: i64,
) -> Result<bool, rusqlite::Error> {
    match kind {
        TargetKind::Post => posts::post_exists(conn, target_id),
        TargetKind::Comment => comments::comment_exists(conn, target_id),
    }
}
