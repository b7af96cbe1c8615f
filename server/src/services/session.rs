//! Per-request session source for the route gate.
//!
//! ARCHITECTURE
//! ============
//! A full-page request carries at most one ID token (the `__session`
//! cookie). `RequestIdentity` exposes that token to the navigation guard as
//! an identity service whose status is determined by one lookup against the
//! hosted identity service.
//!
//! TRADE-OFFS
//! ==========
//! Lookup failures are reported as "signed out": the guard does not
//! distinguish an unreachable identity service from an absent session, so a
//! transient outage sends users to the public route instead of erroring.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};

use gate::{AuthListener, Identity, IdentityService, SessionStatus, Subscription};

use super::identity::IdentityApi;

/// Identity service view of a single request's session token.
pub struct RequestIdentity {
    api: Arc<dyn IdentityApi>,
    token: Option<String>,
    resolved: Arc<Mutex<Option<Identity>>>,
}

impl RequestIdentity {
    #[must_use]
    pub fn new(api: Arc<dyn IdentityApi>, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { api, token, resolved: Arc::new(Mutex::new(None)) }
    }
}

impl IdentityService for RequestIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.resolved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn on_auth_state_changed(&self, mut listener: AuthListener) -> Subscription {
        let Some(token) = self.token.clone() else {
            listener(&SessionStatus::Unauthenticated);
            return Subscription::empty();
        };

        let api = Arc::clone(&self.api);
        let resolved = Arc::clone(&self.resolved);
        let task = tokio::spawn(async move {
            let status = match api.lookup(&token).await {
                Ok(user) => SessionStatus::from_user(user),
                Err(e) => {
                    tracing::warn!(error = %e, "session lookup failed; treating request as signed out");
                    SessionStatus::Unauthenticated
                }
            };
            *resolved.lock().unwrap_or_else(PoisonError::into_inner) = status.identity().cloned();
            listener(&status);
        });

        let abort = task.abort_handle();
        Subscription::new(move || abort.abort())
    }
}
