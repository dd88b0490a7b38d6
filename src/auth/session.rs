use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, parse_timestamp};
use crate::extractors::CurrentUser;

const TOKEN_BYTES: usize = 32;

/// A freshly issued session. The caller must hand `token` to the client.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Create a new session for a user, expiring `hours` from now.
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    hours: u64,
) -> Result<NewSession, rusqlite::Error> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(hours as i64);

    conn.execute(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, format_timestamp(expires_at)],
    )?;

    Ok(NewSession { token, expires_at })
}

/// Look up the user behind a token. Unknown, malformed and expired tokens all
/// resolve to `None`; an expired row is removed when it is found.
pub fn resolve_session(
    conn: &Connection,
    token: &str,
) -> Result<Option<CurrentUser>, rusqlite::Error> {
    if !is_well_formed(token) {
        return Ok(None);
    }

    let row = conn
        .query_row(
            "SELECT s.user_id, u.username, s.expires_at FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, username, expires_at)) = row else {
        return Ok(None);
    };

    match parse_timestamp(&expires_at) {
        Some(expiry) if expiry > Utc::now() => Ok(Some(CurrentUser { id, username })),
        _ => {
            delete_session(conn, token)?;
            Ok(None)
        }
    }
}

/// Delete a session by token. Unknown tokens are a no-op.
pub fn delete_session(conn: &Connection, token: &str) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Invalidate every session a user holds.
pub fn delete_user_sessions(conn: &Connection, user_id: i64) -> Result<usize, rusqlite::Error> {
    conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; TOKEN_BYTES] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}

// -- Cookie helpers --

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn session_cookie(name: &str, session: &NewSession) -> String {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}; Expires={}",
        name,
        session.token,
        max_age,
        http_date(session.expires_at)
    )
}

pub fn clear_session_cookie(name: &str) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        name
    )
}

pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users};
    use axum::http::HeaderValue;

    fn session_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn generate_token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn created_session_resolves_to_its_user() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();

        let session = create_session(&conn, alice, 24).unwrap();
        let user = resolve_session(&conn, &session.token).unwrap().unwrap();
        assert_eq!(user.id, alice);
        assert_eq!(user.username, "alice");

        let ttl = session.expires_at - Utc::now();
        assert!(ttl <= Duration::hours(24) && ttl > Duration::hours(23));
    }

    #[test]
    fn unknown_and_malformed_tokens_do_not_resolve() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        assert!(resolve_session(&conn, &generate_token()).unwrap().is_none());
        assert!(resolve_session(&conn, "").unwrap().is_none());
        assert!(resolve_session(&conn, "'; DROP TABLE sessions; --").unwrap().is_none());
    }

    #[test]
    fn expired_session_does_not_resolve_and_is_removed() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        let session = create_session(&conn, alice, 24).unwrap();
        conn.execute(
            "UPDATE sessions SET expires_at = ?1",
            params![format_timestamp(Utc::now() - Duration::minutes(1))],
        )
        .unwrap();

        assert!(resolve_session(&conn, &session.token).unwrap().is_none());
        assert_eq!(session_rows(&conn), 0);
    }

    #[test]
    fn delete_session_is_idempotent() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        let session = create_session(&conn, alice, 24).unwrap();

        delete_session(&conn, &session.token).unwrap();
        delete_session(&conn, &session.token).unwrap();
        assert!(resolve_session(&conn, &session.token).unwrap().is_none());
    }

    #[test]
    fn delete_user_sessions_revokes_all_of_them() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::create_user(&conn, "a@x.com", "alice", "h").unwrap();
        let bob = users::create_user(&conn, "b@x.com", "bob", "h").unwrap();
        create_session(&conn, alice, 24).unwrap();
        create_session(&conn, alice, 24).unwrap();
        let bobs = create_session(&conn, bob, 24).unwrap();

        assert_eq!(delete_user_sessions(&conn, alice).unwrap(), 2);
        assert_eq!(session_rows(&conn), 1);
        assert!(resolve_session(&conn, &bobs.token).unwrap().is_some());
    }

    #[test]
    fn session_cookie_attributes() {
        let session = NewSession {
            token: "abc".to_string(),
            expires_at: Utc::now() + Duration::hours(24),
        };
        let cookie = session_cookie("forum_session", &session);
        assert!(cookie.starts_with("forum_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Expires="));

        let cleared = clear_session_cookie("forum_session");
        assert!(cleared.starts_with("forum_session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_value_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; forum_session=tok; other=x"),
        );
        assert_eq!(get_cookie_value(&headers, "forum_session"), Some("tok"));
        assert_eq!(get_cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }
}
