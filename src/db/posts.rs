use rusqlite::{params, Connection, OptionalExtension};

use super::comments;
use super::models::{Category, PostDetail, TargetKind};
use super::now_timestamp;
use super::reactions;

/// Inserts a post and its category pairings in one transaction.
/// Category ids that do not exist are skipped.
pub fn create_post(
    conn: &mut Connection,
    user_id: i64,
    title: &str,
    content: &str,
    category_ids: &[i64],
) -> Result<i64, rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO posts (user_id, title, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, title, content, now_timestamp()],
    )?;
    let post_id = tx.last_insert_rowid();

    {
        let mut pair = tx.prepare(
            "INSERT OR IGNORE INTO post_categories (post_id, category_id)
             SELECT ?1, id FROM categories WHERE id = ?2",
        )?;
        for category_id in category_ids {
            pair.execute(params![post_id, category_id])?;
        }
    }

    tx.commit()?;
    Ok(post_id)
}

pub fn post_exists(conn: &Connection, post_id: i64) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM posts WHERE id = ?1)",
        params![post_id],
        |row| row.get(0),
    )
}

/// Full post view. `Ok(None)` means no such post.
pub fn get_post_detail(
    conn: &Connection,
    post_id: i64,
) -> Result<Option<PostDetail>, rusqlite::Error> {
    let head = conn
        .query_row(
            "SELECT p.title, p.content, p.created_at, u.username
             FROM posts p JOIN users u ON u.id = p.user_id
             WHERE p.id = ?1",
            params![post_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((title, content, created_at, author)) = head else {
        return Ok(None);
    };

    let categories = post_categories(conn, post_id)?;
    let (likes, dislikes) = reactions::tally(conn, TargetKind::Post, post_id)?;
    let comments = comments::list_for_post(conn, post_id)?;

    Ok(Some(PostDetail {
        id: post_id,
        title,
        content,
        created_at,
        author,
        categories,
        likes,
        dislikes,
        comments,
    }))
}

fn post_categories(conn: &Connection, post_id: i64) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT c.name FROM categories c
         JOIN post_categories pc ON pc.category_id = c.id
         WHERE pc.post_id = ?1
         ORDER BY c.name",
    )?;
    let names = stmt
        .query_map(params![post_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}
