//! Authentication state machine.
//!
//! ```text
//! Unauthenticated --LoginStarted--> PendingCallback --CallbackSucceeded--> Authenticated
//!        ^                                 |                                     |
//!        +-------- CallbackFailed ---------+                                     |
//!        +------------------------ SignedOut / SessionExpired ------------------+
//! ```
//!
//! The phase is stored in the cookie session. The profile behind an
//! `Authenticated` phase is resolved per request, never cached here.

use serde::{Deserialize, Serialize};

/// Where a visitor is in the sign-in flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Sent to the OAuth provider, callback not yet received.
    PendingCallback,
    Authenticated,
}

/// Something that moves a visitor between [`AuthState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoginStarted,
    CallbackSucceeded,
    /// Missing parameters or a rejected token exchange.
    CallbackFailed,
    /// The hosted backend no longer recognises the stored session.
    SessionExpired,
    SignedOut,
}

impl AuthState {
    /// The state after `event`.
    ///
    /// A callback is honoured without a pending marker, since the marker
    /// lives in a cookie the browser may have dropped.
    #[must_use]
    pub const fn apply(self, event: AuthEvent) -> Self {
        match (self, event) {
            (Self::Authenticated, AuthEvent::LoginStarted) => Self::Authenticated,
            (_, AuthEvent::LoginStarted) => Self::PendingCallback,
            (_, AuthEvent::CallbackSucceeded) => Self::Authenticated,
            (_, AuthEvent::CallbackFailed | AuthEvent::SessionExpired | AuthEvent::SignedOut) => {
                Self::Unauthenticated
            }
        }
    }

    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}
