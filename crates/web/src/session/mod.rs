//! Session manager.
//!
//! Wraps the hosted account API: OAuth initiation and callback, per-request
//! session lookup, and sign-out. The hosted session secret lives only in the
//! server-side cookie session.

pub mod state;

pub use state::{AuthEvent, AuthState};

use tower_sessions::Session;
use tracing::{debug, error, info, instrument, warn};

use gymnet_core::{AccountId, Email, Profile, ProfileDraft};

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::AppConfig;
use crate::repository::ProfileRepository;

/// OAuth provider used for sign-in.
pub const OAUTH_PROVIDER: &str = "google";

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/api/auth/callback";

/// Cookie session keys.
pub mod keys {
    /// Current [`AuthState`](super::AuthState).
    pub const AUTH_STATE: &str = "auth_state";

    /// Hosted session secret.
    pub const APPWRITE_SESSION: &str = "appwrite_session";
}

/// Result of handling an OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success,
    MissingParams,
    /// The token exchange was rejected; carries a user-facing message.
    ExchangeFailed(String),
}

impl CallbackOutcome {
    /// Where to send the browser afterwards.
    #[must_use]
    pub fn redirect_location(&self) -> String {
        match self {
            Self::Success => "/?auth_success=true".to_string(),
            Self::MissingParams => "/?auth_error=missing_params".to_string(),
            Self::ExchangeFailed(message) => {
                format!("/?auth_error={}", urlencoding::encode(message))
            }
        }
    }
}

/// Message for a failed token exchange, without the error-kind prefix.
fn exchange_message(err: &AppwriteError) -> String {
    match err {
        AppwriteError::Api { message, .. }
        | AppwriteError::NotFound(message)
        | AppwriteError::Conflict(message)
        | AppwriteError::Unauthorized(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Coordinates sign-in state between the cookie session and the hosted
/// account service.
#[derive(Clone)]
pub struct SessionManager {
    client: AppwriteClient,
    profiles: ProfileRepository,
    success_url: String,
    failure_url: String,
}

impl SessionManager {
    #[must_use]
    pub fn new(client: AppwriteClient, profiles: ProfileRepository, config: &AppConfig) -> Self {
        Self {
            client,
            profiles,
            success_url: config.absolute_url(CALLBACK_PATH),
            failure_url: config.absolute_url("/?auth_error=user_cancelled"),
        }
    }

    /// Current phase for this visitor.
    pub async fn auth_state(&self, session: &Session) -> AuthState {
        session
            .get::<AuthState>(keys::AUTH_STATE)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    async fn transition(&self, session: &Session, event: AuthEvent) -> AuthState {
        let next = self.auth_state(session).await.apply(event);
        if let Err(e) = session.insert(keys::AUTH_STATE, next).await {
            warn!(error = %e, ?event, "Failed to store auth state");
        }
        next
    }

    /// Record the pending marker and return the provider URL to redirect to.
    ///
    /// # Errors
    ///
    /// Returns an error if the hosted endpoint does not form a valid URL.
    #[instrument(skip_all)]
    pub async fn begin_login(&self, session: &Session) -> Result<String, AppwriteError> {
        let url = self
            .client
            .oauth2_token_url(OAUTH_PROVIDER, &self.success_url, &self.failure_url)?;
        self.transition(session, AuthEvent::LoginStarted).await;
        Ok(url)
    }

    /// Exchange the callback's one-time token for a session.
    ///
    /// On success the session id is cycled, the secret stored, and the
    /// member's profile resolved (created on first sign-in).
    #[instrument(skip_all, fields(user_id = user_id.unwrap_or_default()))]
    pub async fn complete_callback(
        &self,
        session: &Session,
        user_id: Option<&str>,
        secret: Option<&str>,
    ) -> CallbackOutcome {
        let (Some(user_id), Some(secret)) = (
            user_id.filter(|s| !s.trim().is_empty()),
            secret.filter(|s| !s.trim().is_empty()),
        ) else {
            debug!("Callback without userId/secret");
            self.transition(session, AuthEvent::CallbackFailed).await;
            return CallbackOutcome::MissingParams;
        };

        let hosted = match self.client.create_session(user_id, secret).await {
            Ok(hosted) => hosted,
            Err(e) => {
                warn!(error = %e, "Token exchange failed");
                self.transition(session, AuthEvent::CallbackFailed).await;
                return CallbackOutcome::ExchangeFailed(exchange_message(&e));
            }
        };

        if let Err(e) = session.cycle_id().await {
            warn!(error = %e, "Failed to cycle session id");
        }
        if let Err(e) = session.insert(keys::APPWRITE_SESSION, &hosted.secret).await {
            error!(error = %e, "Failed to store session secret");
            self.transition(session, AuthEvent::CallbackFailed).await;
            return CallbackOutcome::ExchangeFailed("Could not store session".to_string());
        }
        self.transition(session, AuthEvent::CallbackSucceeded).await;
        info!(user_id = %hosted.user_id, "Signed in");

        // Creates the profile on first sign-in; failures surface on next load
        match self.current_profile(session).await {
            Some(profile) => debug!(profile_id = %profile.id, "Profile resolved after sign-in"),
            None => debug!("No profile resolved after sign-in"),
        }
        CallbackOutcome::Success
    }

    /// The signed-in member's profile, if any.
    ///
    /// Only an authenticated session is looked up. No session is an expected
    /// outcome and is not logged above debug. An account without a profile
    /// gets a default one.
    #[instrument(skip_all)]
    pub async fn current_profile(&self, session: &Session) -> Option<Profile> {
        if !self.auth_state(session).await.is_authenticated() {
            return None;
        }
        let secret = session
            .get::<String>(keys::APPWRITE_SESSION)
            .await
            .ok()
            .flatten()?;

        let account = match self.client.get_account(&secret).await {
            Ok(account) => account,
            Err(AppwriteError::Unauthorized(_)) => {
                debug!("Stored session is no longer valid");
                self.forget(session, AuthEvent::SessionExpired).await;
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to look up account");
                return None;
            }
        };

        let account_id = AccountId::new(account.id.as_str());
        match self.profiles.find_by_account(&account_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                let email = match Email::parse(&account.email) {
                    Ok(email) => email,
                    Err(e) => {
                        warn!(error = %e, account_id = %account_id, "Account has no usable email");
                        return None;
                    }
                };
                let avatar = self.profiles.avatar_url(&account.name);
                let draft = ProfileDraft::for_new_account(account_id, &account.name, &email, avatar);
                match self.profiles.create(&draft).await {
                    Ok(profile) => {
                        info!(profile_id = %profile.id, "Created default profile");
                        Some(profile)
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to create default profile");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to look up profile");
                None
            }
        }
    }

    /// Destroy the hosted session and clear local state. Never fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, session: &Session) {
        if let Ok(Some(secret)) = session.get::<String>(keys::APPWRITE_SESSION).await
            && let Err(e) = self.client.delete_current_session(&secret).await
        {
            warn!(error = %e, "Failed to delete hosted session");
        }
        self.forget(session, AuthEvent::SignedOut).await;
    }

    async fn forget(&self, session: &Session, event: AuthEvent) {
        if let Err(e) = session.remove::<String>(keys::APPWRITE_SESSION).await {
            warn!(error = %e, "Failed to clear session secret");
        }
        self.transition(session, event).await;
    }
}
