use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::db::listing::{self, ListingFilter};
use crate::db::models::PostSummary;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser, Theme};
use crate::routes::page::{not_found_page, Html, PageContext};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub posts: Vec<PostSummary>,
    pub active_category: String,
    pub mine: bool,
    pub liked: bool,
}

/// Query string of the listing page.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub cat: Option<String>,
    pub mine: Option<String>,
    pub liked: Option<String>,
}

impl ListingParams {
    /// Personal filters only apply to signed-in users; for anyone else they are ignored.
    pub fn to_filter(&self, user: Option<&CurrentUser>) -> ListingFilter {
        let mut filter = ListingFilter::new();

        if let Some(cat) = self.cat.as_deref().filter(|c| !c.is_empty()) {
            filter = filter.category(cat);
        }
        if let Some(user) = user {
            if self.mine.as_deref() == Some("1") {
                filter = filter.owned_by(user.id);
            }
            if self.liked.as_deref() == Some("1") {
                filter = filter.liked_by(user.id);
            }
        }
        filter
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/filter/mine", get(my_posts))
        .route("/filter/liked", get(my_liked))
}

/// GET / — the post listing
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    theme: Theme,
    Query(params): Query<ListingParams>,
) -> AppResult<Response> {
    let filter = params.to_filter(user.as_ref());

    let conn = state.db.get()?;
    let page = PageContext::load(&conn, user.as_ref(), theme)?;
    let posts = listing::list_posts(&conn, &filter)?;

    let signed_in = user.is_some();
    Ok(Html(HomeTemplate {
        page,
        posts,
        active_category: params.cat.clone().unwrap_or_default(),
        mine: signed_in && params.mine.as_deref() == Some("1"),
        liked: signed_in && params.liked.as_deref() == Some("1"),
    })
    .into_response())
}

/// GET /filter/mine
async fn my_posts(_user: CurrentUser) -> Redirect {
    Redirect::to("/?mine=1")
}

/// GET /filter/liked
async fn my_liked(_user: CurrentUser) -> Redirect {
    Redirect::to("/?liked=1")
}

/// Fallback for every unknown path.
pub async fn not_found(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    theme: Theme,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let page = PageContext::load(&conn, user.as_ref(), theme)?;
    Ok(not_found_page(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(cat: Option<&str>, mine: Option<&str>, liked: Option<&str>) -> ListingParams {
        ListingParams {
            cat: cat.map(String::from),
            mine: mine.map(String::from),
            liked: liked.map(String::from),
        }
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 7,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn anonymous_callers_lose_personal_filters() {
        let filter = params(None, Some("1"), Some("1")).to_filter(None);
        assert!(filter.is_empty());
    }

    #[test]
    fn signed_in_callers_get_all_filters() {
        let user = alice();
        let filter = params(Some("News"), Some("1"), Some("1")).to_filter(Some(&user));
        let sql = filter.sql();
        assert!(sql.contains("c.name = :category"));
        assert!(sql.contains("p.user_id = :owner"));
        assert!(sql.contains("lr.user_id = :liker"));
    }

    #[test]
    fn flags_other_than_one_and_empty_category_are_ignored() {
        let user = alice();
        let filter = params(Some(""), Some("true"), Some("0")).to_filter(Some(&user));
        assert!(filter.is_empty());
    }
}
