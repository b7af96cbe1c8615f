//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the protected route and user-aware pages to coordinate login
//! redirects and identity-dependent rendering. The value mirrors the latest
//! status published on the auth hub.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gate::{Identity, SessionStatus};

/// Authentication state: pending until the first session report arrives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub status: SessionStatus,
}

impl AuthState {
    /// Route condition: `None` while pending, then whether access is allowed.
    pub fn access(&self) -> Option<bool> {
        self.status.access()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.status.identity()
    }

    pub fn loading(&self) -> bool {
        self.status.is_pending()
    }
}

impl From<SessionStatus> for AuthState {
    fn from(status: SessionStatus) -> Self {
        Self { status }
    }
}
