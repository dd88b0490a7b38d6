use rusqlite::{params, Connection};

use super::models::Comment;
use super::now_timestamp;

pub fn create_comment(
    conn: &Connection,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![post_id, user_id, content, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn comment_exists(conn: &Connection, comment_id: i64) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM comments WHERE id = ?1)",
        params![comment_id],
        |row| row.get(0),
    )
}

/// Comments of a post, oldest first, each with its own reaction tallies.
pub fn list_for_post(conn: &Connection, post_id: i64) -> Result<Vec<Comment>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.post_id, c.content, u.username, c.created_at,
            (SELECT COUNT(*) FROM reactions r
                WHERE r.target_type = 'comment' AND r.target_id = c.id AND r.value = 1),
            (SELECT COUNT(*) FROM reactions r
                WHERE r.target_type = 'comment' AND r.target_id = c.id AND r.value = -1)
         FROM comments c
         JOIN users u ON u.id = c.user_id
         WHERE c.post_id = ?1
         ORDER BY c.created_at, c.id",
    )?;
    let comments = stmt
        .query_map(params![post_id], |row| {
            Ok(Comment {
                id: row.get(0)?,
                post_id: row.get(1)?,
                content: row.get(2)?,
                author: row.get(3)?,
                created_at: row.get(4)?,
                likes: row.get(5)?,
                dislikes: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ReactionValue, TargetKind};
    use crate::db::{posts, reactions, test_pool, users};

    #[test]
    fn comments_are_oldest_first_with_authors() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        let bob = users::create_user(&conn, "b@x.com", "bob", "h").unwrap();
        let post = posts::create_post(&mut conn, alice, "T", "C", &[]).unwrap();

        let first = create_comment(&conn, post, bob, "first").unwrap();
        let second = create_comment(&conn, post, alice, "second").unwrap();

        let comments = list_for_post(&conn, post).unwrap();
        let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(comments[0].author, "bob");
        assert_eq!(comments[1].content, "second");
    }

    #[test]
    fn comment_tallies_are_per_comment() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        let bob = users::create_user(&conn, "b@x.com", "bob", "h").unwrap();
        let post = posts::create_post(&mut conn, alice, "T", "C", &[]).unwrap();
        let liked = create_comment(&conn, post, bob, "liked").unwrap();
        let plain = create_comment(&conn, post, bob, "plain").unwrap();

        reactions::upsert_reaction(&conn, alice, TargetKind::Comment, liked, ReactionValue::Like)
            .unwrap();
        reactions::upsert_reaction(&conn, bob, TargetKind::Comment, liked, ReactionValue::Dislike)
            .unwrap();
        // a post reaction sharing the comment's id stays out of the comment tally
        reactions::upsert_reaction(&conn, alice, TargetKind::Post, plain, ReactionValue::Like)
            .unwrap();

        let comments = list_for_post(&conn, post).unwrap();
        assert_eq!((comments[0].likes, comments[0].dislikes), (1, 1));
        assert_eq!((comments[1].likes, comments[1].dislikes), (0, 0));
    }

    #[test]
    fn comment_on_missing_post_is_rejected_by_store() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        assert!(create_comment(&conn, 404, alice, "orphan").is_err());
        assert!(!comment_exists(&conn, 1).unwrap());
    }
}
