use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;

use crate::auth::session::get_cookie_value;
use crate::auth::Identity;
use crate::error::AppError;

/// Represents the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Extractor that requires authentication.
/// Returns 401 if the request carried no valid session.
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(|identity| identity.0.clone())
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional user extractor — `None` for anonymous callers instead of 401.
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<Identity>()
                .and_then(|identity| identity.0.clone()),
        ))
    }
}

pub const THEME_COOKIE: &str = "theme";

/// Cosmetic colour scheme, carried in its own long-lived cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Anything other than "light" or "dark" falls back to light.
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Theme {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Theme::from_cookie(get_cookie_value(&parts.headers, THEME_COOKIE)))
    }
}

/// An `application/x-www-form-urlencoded` body that keeps repeated keys.
/// Absent fields read as empty strings.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `name`, or "" when absent.
    pub fn get(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl<S: Send + Sync> FromRequest<S> for FormFields {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid request body".into()))?;
        Ok(FormFields::parse(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request as HttpRequest};

    fn parts_with(identity: Option<Identity>, cookie: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(identity) = identity {
            parts.extensions.insert(identity);
        }
        parts
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn current_user_requires_resolved_identity() {
        let mut anon = parts_with(Some(Identity(None)), None);
        assert!(matches!(
            CurrentUser::from_request_parts(&mut anon, &()).await,
            Err(AppError::Unauthorized)
        ));

        let mut missing = parts_with(None, None);
        assert!(CurrentUser::from_request_parts(&mut missing, &()).await.is_err());

        let mut logged = parts_with(Some(Identity(Some(alice()))), None);
        assert_eq!(
            CurrentUser::from_request_parts(&mut logged, &()).await.unwrap(),
            alice()
        );
    }

    #[tokio::test]
    async fn maybe_user_never_rejects() {
        let mut anon = parts_with(None, None);
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut anon, &()).await.unwrap();
        assert!(user.is_none());

        let mut logged = parts_with(Some(Identity(Some(alice()))), None);
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut logged, &()).await.unwrap();
        assert_eq!(user, Some(alice()));
    }

    #[tokio::test]
    async fn theme_reads_cookie_with_light_default() {
        let mut dark = parts_with(None, Some("theme=dark"));
        assert_eq!(Theme::from_request_parts(&mut dark, &()).await.unwrap(), Theme::Dark);

        let mut bogus = parts_with(None, Some("theme=neon"));
        assert_eq!(Theme::from_request_parts(&mut bogus, &()).await.unwrap(), Theme::Light);

        let mut none = parts_with(None, None);
        assert_eq!(Theme::from_request_parts(&mut none, &()).await.unwrap(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn form_fields_keep_repeated_keys() {
        let form = FormFields::parse(b"title=Hello+world&cats=1&cats=3&content=a%26b");
        assert_eq!(form.get("title"), "Hello world");
        assert_eq!(form.get("content"), "a&b");
        assert_eq!(form.get_all("cats"), vec!["1", "3"]);
        assert_eq!(form.get("missing"), "");
        assert!(form.get_all("missing").is_empty());
    }
}
