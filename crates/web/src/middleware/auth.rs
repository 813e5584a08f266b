//! Authentication extractors.
//!
//! The signed-in member is resolved per request from the cookie session via
//! [`SessionManager::current_profile`](crate::session::SessionManager::current_profile).

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use gymnet_core::Profile;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login";

async fn resolve(parts: &Parts, state: &AppState) -> Option<Profile> {
    let session = parts.extensions.get::<Session>()?;
    let profile = state.sessions().current_profile(session).await?;
    set_sentry_user(&profile.id, Some(&profile.email));
    Some(profile)
}

/// The signed-in member, if any.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(viewer): CurrentUser) -> impl IntoResponse {
///     match viewer {
///         Some(p) => format!("Hello, {}!", p.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentUser(pub Option<Profile>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await))
    }
}

/// Extractor that requires a signed-in member.
pub struct RequireUser(pub Profile);

/// Returned when a route needs a signed-in member and there is none.
#[derive(Debug)]
pub enum AuthRejection {
    /// Full page request.
    RedirectToLogin,
    /// HTMX or API request; HTMX follows the `HX-Redirect` header.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => {
                let mut response = StatusCode::UNAUTHORIZED.into_response();
                response
                    .headers_mut()
                    .insert("hx-redirect", HeaderValue::from_static(LOGIN_PATH));
                response
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(Self).ok_or_else(|| {
            let is_api = parts.uri.path().starts_with("/api/")
                || parts.headers.contains_key("hx-request");
            if is_api {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}
