//! Application state shared across handlers.

use std::sync::Arc;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::AppConfig;
use crate::discovery::Showcase;
use crate::repository::{LikeRepository, ProfileRepository};
use crate::session::SessionManager;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    profiles: ProfileRepository,
    likes: LikeRepository,
    showcase: Arc<Showcase>,
    sessions: SessionManager,
}

impl AppState {
    /// Create the application state and its hosted-backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, AppwriteError> {
        let client = AppwriteClient::new(&config.appwrite)?;
        let profiles = ProfileRepository::new(client.clone(), &config.appwrite);
        let likes = LikeRepository::new(client.clone(), &config.appwrite);
        let sessions = SessionManager::new(client, profiles.clone(), &config);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                profiles,
                likes,
                showcase: Arc::new(Showcase::new()),
                sessions,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileRepository {
        &self.inner.profiles
    }

    #[must_use]
    pub fn likes(&self) -> &LikeRepository {
        &self.inner.likes
    }

    /// The landing-page showcase, shared with the refresh task.
    #[must_use]
    pub fn showcase(&self) -> &Arc<Showcase> {
        &self.inner.showcase
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }
}
