use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::db::models::{PostDetail, TargetKind};
use crate::db::{posts, reactions};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, FormFields, MaybeUser, Theme};
use crate::routes::page::{not_found_page, Html, PageContext};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/new_post.html")]
pub struct NewPostTemplate {
    pub page: PageContext,
}

#[derive(Template)]
#[template(path = "pages/post.html")]
pub struct PostTemplate {
    pub page: PageContext,
    pub post: PostDetail,
    /// The viewer's own reaction to the post: 1, -1 or 0 for none.
    pub my_reaction: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post/new", get(new_post_page))
        .route("/post/create", post(create_post))
        .route("/post/{id}", get(show_post))
}

/// GET /post/new
async fn new_post_page(
    State(state): State<AppState>,
    user: CurrentUser,
    theme: Theme,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = PageContext::load(&conn, Some(&user), theme)?;
    Ok(Html(NewPostTemplate { page }).into_response())
}

/// POST /post/create
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    form: FormFields,
) -> AppResult<Response> {
    let title = form.get("title").trim();
    let content = form.get("content").trim();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::BadRequest("Title and content required".into()));
    }

    // unparseable ids are skipped like unknown ones
    let category_ids: Vec<i64> = form
        .get_all("cats")
        .into_iter()
        .filter_map(|raw| raw.trim().parse().ok())
        .collect();

    let mut conn = state.db.get()?;
    let post_id = posts::create_post(&mut conn, user.id, title, content, &category_ids)?;
    tracing::info!(post_id, user_id = user.id, "Post created");

    Ok(Redirect::to(&format!("/post/{}", post_id)).into_response())
}

/// GET /post/{id}
async fn show_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    theme: Theme,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = PageContext::load(&conn, user.as_ref(), theme)?;

    let detail = match id.parse::<i64>() {
        Ok(post_id) => posts::get_post_detail(&conn, post_id)?,
        Err(_) => None,
    };
    let Some(post) = detail else {
        return Ok(not_found_page(page));
    };

    let my_reaction = match &user {
        Some(user) => reactions::user_reaction(&conn, user.id, TargetKind::Post, post.id)?
            .map(|value| value.as_i64())
            .unwrap_or(0),
        None => 0,
    };

    Ok(Html(PostTemplate {
        page,
        post,
        my_reaction,
    })
    .into_response())
}

