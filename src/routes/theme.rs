use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};

use crate::extractors::{Theme, THEME_COOKIE};
use crate::routes::page::back_location;
use crate::state::AppState;

const THEME_COOKIE_DAYS: i64 = 365;

pub fn router() -> Router<AppState> {
    Router::new().route("/toggle-theme", get(toggle_theme).post(toggle_theme))
}

fn theme_cookie(theme: Theme) -> String {
    let expires = Utc::now() + Duration::days(THEME_COOKIE_DAYS);
    format!(
        "{}={}; Path=/; Max-Age={}; Expires={}",
        THEME_COOKIE,
        theme.as_str(),
        THEME_COOKIE_DAYS * 24 * 3600,
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// /toggle-theme — flip light/dark and go back where the visitor came from.
/// Works for guests too.
async fn toggle_theme(theme: Theme, headers: HeaderMap) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, back_location(&headers)),
            (header::SET_COOKIE, theme_cookie(theme.toggled())),
        ],
    )
        .into_response()
}
