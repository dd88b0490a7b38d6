use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::Router;

use crate::db::models::{ReactionValue, TargetKind};
use crate::db::reactions;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, FormFields, Theme};
use crate::routes::page::{back_location, not_found_page, PageContext};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/react", post(react))
}

/// POST /react — like or dislike a post or comment, replacing any earlier reaction
async fn react(
    State(state): State<AppState>,
    user: CurrentUser,
    theme: Theme,
    headers: HeaderMap,
    form: FormFields,
) -> AppResult<Response> {
    let kind: TargetKind = form.get("type").parse().map_err(AppError::BadRequest)?;
    let value = ReactionValue::from_form(form.get("value"));

    let conn = state.db.get()?;
    let target_id = match form.get("id").trim().parse::<i64>() {
        Ok(id) if reactions::target_exists(&conn, kind, id)? => id,
        _ => {
            let page = PageContext::load(&conn, Some(&user), theme)?;
            return Ok(not_found_page(page));
        }
    };

    reactions::upsert_reaction(&conn, user.id, kind, target_id, value)?;
    tracing::debug!(
        user_id = user.id,
        target = %kind,
        target_id,
        value = value.as_i64(),
        "Reaction recorded"
    );

    Ok(Redirect::to(&back_location(&headers)).into_response())
}
