//! Landing page and discovery fragments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use gymnet_core::Profile;

use crate::filters;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Query parameters on the landing page, set by the OAuth callback.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub auth_error: Option<String>,
    pub auth_success: Option<String>,
}

/// Banner text for an `auth_error` code or message.
fn auth_error_message(code: &str) -> String {
    match code {
        "missing_params" => "Sign-in failed: the provider did not return credentials.".to_string(),
        "user_cancelled" => "Sign-in was cancelled.".to_string(),
        "configuration" => "Sign-in is not available right now.".to_string(),
        message => format!("Sign-in failed: {message}"),
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub viewer: Option<Profile>,
    pub profiles: Vec<Profile>,
    pub signed_in_notice: bool,
    pub error_notice: Option<String>,
}

/// Showcase grid (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/showcase.html")]
pub struct ShowcaseTemplate {
    pub profiles: Vec<Profile>,
}

/// Search results (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_results.html")]
pub struct SearchResultsTemplate {
    pub query: String,
    pub profiles: Vec<Profile>,
}

/// Landing page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let mut profiles = state.showcase().profiles().await;
    if profiles.is_empty() {
        // Refresh task has not produced a set yet
        profiles = state.showcase().refresh(state.profiles()).await;
    }

    HomeTemplate {
        viewer,
        profiles,
        signed_in_notice: query.auth_success.as_deref() == Some("true"),
        error_notice: query.auth_error.as_deref().map(auth_error_message),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Current showcase; `?refresh=true` resamples first.
#[instrument(skip(state))]
pub async fn discover(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> impl IntoResponse {
    let profiles = if query.refresh {
        state.showcase().refresh(state.profiles()).await
    } else {
        state.showcase().profiles().await
    };

    ShowcaseTemplate { profiles }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search endpoint (HTMX). The input debounces client-side.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let term = query.q.trim();

    let profiles = if term.is_empty() {
        Vec::new()
    } else {
        state.profiles().search(term).await
    };

    SearchResultsTemplate {
        query: term.to_string(),
        profiles,
    }
}
