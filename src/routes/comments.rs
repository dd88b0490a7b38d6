use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::Router;

use crate::db::{comments, posts};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, FormFields, Theme};
use crate::routes::page::{not_found_page, PageContext};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/comment/create", post(create_comment))
}

/// POST /comment/create — comment on an existing post
async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    theme: Theme,
    form: FormFields,
) -> AppResult<Response> {
    let content = form.get("content").trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Empty comments are not allowed".into()));
    }

    let conn = state.db.get()?;
    let post_id = match form.get("post_id").trim().parse::<i64>() {
        Ok(id) if posts::post_exists(&conn, id)? => id,
        _ => {
            let page = PageContext::load(&conn, Some(&user), theme)?;
            return Ok(not_found_page(page));
        }
    };

    let comment_id = comments::create_comment(&conn, post_id, user.id, content)?;
    tracing::info!(comment_id, post_id, user_id = user.id, "Comment created");

    Ok(Redirect::to(&format!("/post/{}", post_id)).into_response())
}
