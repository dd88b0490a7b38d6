use askama::Template;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use rusqlite::Connection;

use crate::db::models::Category;
use crate::db::posts;
use crate::extractors::{CurrentUser, Theme};

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// What every page's layout needs: theme, who is signed in, and the category sidebar.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub theme: &'static str,
    pub logged_in: bool,
    pub username: String,
    pub categories: Vec<Category>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            theme: Theme::default().as_str(),
            logged_in: false,
            username: String::new(),
            categories: Vec::new(),
        }
    }
}

impl PageContext {
    pub fn load(
        conn: &Connection,
        user: Option<&CurrentUser>,
        theme: Theme,
    ) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            theme: theme.as_str(),
            logged_in: user.is_some(),
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            categories: posts::list_categories(conn)?,
        })
    }
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

/// The rendered 404 page.
pub fn not_found_page(page: PageContext) -> Response {
    let mut response = Html(NotFoundTemplate { page }).into_response();
    if response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NOT_FOUND;
    }
    response
}

/// Where to send the client after a form post: the path of the `Referer`
/// when there is one, otherwise the home page. Never an external URL.
pub fn back_location(headers: &HeaderMap) -> String {
    let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) else {
        return "/".to_string();
    };

    let location = if referer.starts_with('/') {
        referer.to_string()
    } else {
        match url::Url::parse(referer) {
            Ok(url) => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
            Err(_) => return "/".to_string(),
        }
    };

    if is_local_path(&location) {
        location
    } else {
        "/".to_string()
    }
}

// `//host` and `/\host` are read by browsers as another origin.
fn is_local_path(location: &str) -> bool {
    location.starts_with('/') && !location.starts_with("//") && !location.contains('\\')
}
