use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::session;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// Who is making the request, resolved once per request.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<CurrentUser>);

/// Resolve the session cookie and attach an [`Identity`] to the request.
/// Handlers read it through the `CurrentUser` / `MaybeUser` extractors.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = match session::get_cookie_value(request.headers(), &state.config.auth.cookie_name)
    {
        Some(token) => {
            let conn = state.db.get()?;
            session::resolve_session(&conn, token)?
        }
        None => None,
    };

    request.extensions_mut().insert(Identity(user));
    Ok(next.run(request).await)
}
