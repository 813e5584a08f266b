//! OAuth route handlers.
//!
//! - Login: redirects to the hosted OAuth2 token flow (Google)
//! - Callback: exchanges the one-time `userId`/`secret` pair for a session
//! - Logout: destroys the session, best effort, and returns to the landing page

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::session::CallbackOutcome;
use crate::state::AppState;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub secret: Option<String>,
}

/// Start sign-in.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    match state.sessions().begin_login(&session).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::error!("Failed to build OAuth URL: {}", e);
            Redirect::to("/?auth_error=configuration").into_response()
        }
    }
}

/// Handle the OAuth callback.
///
/// Always redirects to the landing page; the outcome travels in the query
/// string.
///
/// # Route
///
/// `GET /api/auth/callback?userId=..&secret=..`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let outcome = state
        .sessions()
        .complete_callback(&session, query.user_id.as_deref(), query.secret.as_deref())
        .await;

    if outcome == CallbackOutcome::Success {
        add_breadcrumb("auth", "Signed in", None);
    }

    Redirect::to(&outcome.redirect_location()).into_response()
}

/// Sign out and return to the landing page, whatever happens remotely.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    state.sessions().sign_out(&session).await;
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);

    Redirect::to("/").into_response()
}
