pub mod assets;
pub mod auth;
pub mod comments;
pub mod home;
pub mod page;
pub mod posts;
pub mod reactions;
pub mod theme;

use std::any::Any;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

use crate::auth::resolve_identity;
use crate::state::AppState;

/// The complete application: every route, identity resolution, and the per-request guards.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(home::router())
        .merge(auth::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(reactions::router())
        .merge(theme::router())
        .merge(assets::router())
        .fallback(home::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .with_state(state);

    with_request_guards(router)
}

/// Request tracing plus panic isolation: a handler that panics yields a 500
/// for that request only and the server keeps running.
///
/// The request span is at INFO so that, under the default filter, every event
/// logged while serving (including faults) carries the method and URI.
pub fn with_request_guards(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
            )
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    // Emitted inside the TraceLayer span, which carries method and URI.
    tracing::error!(panic = %detail, "Request handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
