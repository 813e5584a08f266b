//! Static pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{http::StatusCode, response::IntoResponse};

use gymnet_core::Profile;

use crate::filters;
use crate::middleware::CurrentUser;

#[derive(Template, WebTemplate)]
#[template(path = "creator.html")]
pub struct CreatorTemplate {
    pub viewer: Option<Profile>,
}

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub viewer: Option<Profile>,
}

/// About the creator.
///
/// # Route
///
/// `GET /creator`
pub async fn creator(CurrentUser(viewer): CurrentUser) -> impl IntoResponse {
    CreatorTemplate { viewer }
}

/// Fallback for unknown paths.
pub async fn not_found(CurrentUser(viewer): CurrentUser) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate { viewer })
}
