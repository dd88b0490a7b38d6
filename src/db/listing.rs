//! Post listing with composable filters.
//!
//! Each filter contributes a clause: an optional join, an optional predicate and
//! one value bound to a named parameter. Clauses are combined generically, joins
//! first and predicates AND-ed, so filters can be mixed in any combination.

use rusqlite::types::{ToSql, Value};
use rusqlite::Connection;

use super::models::PostSummary;

/// Maximum number of posts a listing returns.
pub const LISTING_LIMIT: i64 = 200;

const BASE_QUERY: &str = "SELECT p.id, p.title, p.content, p.created_at, u.username,
    (SELECT COUNT(*) FROM reactions r
        WHERE r.target_type = 'post' AND r.target_id = p.id AND r.value = 1) AS likes,
    (SELECT COUNT(*) FROM reactions r
        WHERE r.target_type = 'post' AND r.target_id = p.id AND r.value = -1) AS dislikes
    FROM posts p
    JOIN users u ON u.id = p.user_id";

#[derive(Debug, Clone)]
struct Clause {
    param: &'static str,
    join: Option<&'static str>,
    predicate: Option<&'static str>,
    value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    clauses: Vec<Clause>,
}

impl ListingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts tagged with the named category.
    pub fn category(self, name: impl Into<String>) -> Self {
        self.with(Clause {
            param: ":category",
            join: Some(
                "JOIN post_categories pc ON pc.post_id = p.id \
                 JOIN categories c ON c.id = pc.category_id",
            ),
            predicate: Some("c.name = :category"),
            value: Value::Text(name.into()),
        })
    }

    /// Posts authored by the user.
    pub fn owned_by(self, user_id: i64) -> Self {
        self.with(Clause {
            param: ":owner",
            join: None,
            predicate: Some("p.user_id = :owner"),
            value: Value::Integer(user_id),
        })
    }

    /// Posts the user has liked.
    pub fn liked_by(self, user_id: i64) -> Self {
        self.with(Clause {
            param: ":liker",
            join: Some(
                "JOIN reactions lr ON lr.target_type = 'post' AND lr.target_id = p.id \
                 AND lr.user_id = :liker AND lr.value = 1",
            ),
            predicate: None,
            value: Value::Integer(user_id),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    // a filter applied twice keeps only its latest value
    fn with(mut self, clause: Clause) -> Self {
        self.clauses.retain(|c| c.param != clause.param);
        self.clauses.push(clause);
        self
    }

    pub fn sql(&self) -> String {
        let mut sql = String::from(BASE_QUERY);

        for join in self.clauses.iter().filter_map(|c| c.join) {
            sql.push(' ');
            sql.push_str(join);
        }

        let predicates: Vec<&str> = self.clauses.iter().filter_map(|c| c.predicate).collect();
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        sql.push_str(" ORDER BY p.created_at DESC, p.id DESC LIMIT :limit");
        sql
    }

    pub fn params(&self) -> Vec<(&'static str, &dyn ToSql)> {
        let mut params: Vec<(&'static str, &dyn ToSql)> = self
            .clauses
            .iter()
            .map(|c| (c.param, &c.value as &dyn ToSql))
            .collect();
        params.push((":limit", &LISTING_LIMIT));
        params
    }
}

pub fn list_posts(
    conn: &Connection,
    filter: &ListingFilter,
) -> Result<Vec<PostSummary>, rusqlite::Error> {
    let mut stmt = conn.prepare(&filter.sql())?;
    let params = filter.params();
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok(PostSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
            author: row.get(4)?,
            likes: row.get(5)?,
            dislikes: row.get(6)?,
        })
    })?;
    let posts = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}
