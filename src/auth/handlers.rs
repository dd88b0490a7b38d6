use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::auth::{password, session};
use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::extractors::{FormFields, MaybeUser, Theme};
use crate::routes::page::{Html, PageContext};
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub registered: bool,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub registered: Option<String>,
}

// -- Registration --

/// GET /register
pub async fn register_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    theme: Theme,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = PageContext::load(&conn, user.as_ref(), theme)?;
    Ok(Html(RegisterTemplate { page }).into_response())
}

/// POST /register — create the account, then send the visitor to the login page
pub async fn register(State(state): State<AppState>, form: FormFields) -> AppResult<Response> {
    let email = form.get("email").trim();
    let username = form.get("username").trim();
    let password = form.get("password");

    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("All fields required".into()));
    }

    let hash =
        password::hash_password_blocking(password.to_string(), state.config.auth.bcrypt_cost)
            .await?;

    // The unique constraints are the only duplicate check.
    let conn = state.db.get()?;
    match users::create_user(&conn, email, username, &hash) {
        Ok(user_id) => {
            tracing::info!(user_id, username, "Registered new user");
            Ok(Redirect::to("/login?registered=1").into_response())
        }
        Err(e) => match users::taken_column(&e) {
            Some(taken) => Err(AppError::BadRequest(taken.message().into())),
            None => Err(e.into()),
        },
    }
}

// -- Login handlers --

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    theme: Theme,
    Query(query): Query<LoginQuery>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = PageContext::load(&conn, user.as_ref(), theme)?;
    Ok(Html(LoginTemplate {
        page,
        registered: query.registered.as_deref() == Some("1"),
    })
    .into_response())
}

/// POST /login — check credentials, replace any earlier sessions with a new one
pub async fn login(State(state): State<AppState>, form: FormFields) -> AppResult<Response> {
    let email = form.get("email").trim();
    let password = form.get("password");

    let user = {
        let conn = state.db.get()?;
        users::find_by_email(&conn, email)?
    };

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some(user) = user else {
        tracing::warn!("Failed login attempt");
        return Err(AppError::InvalidCredentials);
    };

    let verified =
        password::verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await?;
    if !verified {
        tracing::warn!("Failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let conn = state.db.get()?;
    let revoked = session::delete_user_sessions(&conn, user.id)?;
    let new_session = session::create_session(&conn, user.id, state.config.auth.session_hours)?;
    tracing::info!(user_id = user.id, revoked = revoked as u64, "User logged in");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                session::session_cookie(&state.config.auth.cookie_name, &new_session),
            ),
        ],
    )
        .into_response())
}

// -- Logout handler --

/// /logout — delete the session if any and clear the cookie. Always redirects home.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_name = &state.config.auth.cookie_name;

    if let Some(token) = session::get_cookie_value(&headers, cookie_name) {
        let deleted = state
            .db
            .get()
            .map_err(AppError::from)
            .and_then(|conn| session::delete_session(&conn, token).map_err(AppError::from));
        match deleted {
            Ok(()) => tracing::info!("User logged out"),
            Err(e) => tracing::warn!("Failed to delete session on logout: {}", e),
        }
    }

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, session::clear_session_cookie(cookie_name)),
        ],
    )
        .into_response()
}
