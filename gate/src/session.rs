//! Session status as reported by the identity service.
//!
//! DESIGN
//! ======
//! The status is tri-state. `Pending` means the identity service has not yet
//! determined whether a user is signed in; it never resolves a guard. The
//! application only observes the status, it never decides it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

/// Signed-in user as reported by the identity service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id issued by the identity service.
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: None, display_name: None, email_verified: false }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Best human-readable label: display name, then email, then uid.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Authentication status of the current session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// The identity service has not reported yet.
    #[default]
    Pending,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionStatus {
    /// Map a user-presence value (the identity-service callback payload).
    #[must_use]
    pub fn from_user(user: Option<Identity>) -> Self {
        match user {
            Some(identity) => Self::Authenticated(identity),
            None => Self::Unauthenticated,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Pending | Self::Unauthenticated => None,
        }
    }

    /// Tri-state access flag: `None` while pending, otherwise whether access
    /// to a protected route is granted.
    #[must_use]
    pub fn access(&self) -> Option<bool> {
        match self {
            Self::Pending => None,
            Self::Authenticated(_) => Some(true),
            Self::Unauthenticated => Some(false),
        }
    }
}
