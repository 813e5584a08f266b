//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page with the profile showcase
//! GET  /health                 - Health check
//! GET  /creator                - About the creator
//!
//! # Discovery (HTMX fragments)
//! GET  /discover               - Current showcase (`?refresh=true` resamples)
//! GET  /search?q=              - Search results
//!
//! # Profiles
//! GET  /profile/edit           - Profile editor (requires auth)
//! POST /profile/edit           - Save profile (multipart, requires auth)
//! GET  /profile/{id}           - Profile page
//! POST /profile/{id}/like      - Toggle like (fragment, requires auth)
//!
//! # Auth
//! GET  /auth/login             - Redirect to the OAuth provider
//! POST /auth/logout            - Sign out
//! GET  /api/auth/callback      - OAuth callback
//! ```

pub mod auth;
pub mod home;
pub mod pages;
pub mod profile;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted profile edit upload.
const MAX_EDIT_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/edit",
            get(profile::edit_page)
                .post(profile::update)
                .layer(DefaultBodyLimit::max(MAX_EDIT_BODY_BYTES)),
        )
        .route("/{id}", get(profile::show))
        .route("/{id}/like", post(profile::toggle_like))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/discover", get(home::discover))
        .route("/search", get(home::search))
        .route("/creator", get(pages::creator))
        .nest("/profile", profile_routes())
        .nest("/auth", auth_routes())
        .route("/api/auth/callback", get(auth::callback))
        .fallback(pages::not_found)
}
