//! Shared auth helpers: mirror the auth hub into reactive state and bootstrap
//! the session in the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hub is the single source of truth for session status. Pages read the
//! `RwSignal<AuthState>` mirror; writers (bootstrap, sign-in, sign-out)
//! publish on the hub.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gate::{AuthHub, Identity, IdentityService, SessionStatus, Subscription};
use leptos::prelude::*;

use crate::state::auth::AuthState;

/// Keep `auth` in sync with every status the hub reports.
pub fn install_auth_listener(hub: &AuthHub, auth: RwSignal<AuthState>) -> Subscription {
    hub.on_auth_state_changed(Box::new(move |status| {
        // The signal may already be disposed when the owner unmounts.
        let _ = auth.try_set(AuthState::from(status.clone()));
    }))
}

/// Status to publish for a `/api/auth/me` answer. Any failure counts as
/// signed out so protected routes never wait forever.
pub fn status_from_lookup(lookup: Result<Option<Identity>, String>) -> SessionStatus {
    match lookup {
        Ok(user) => SessionStatus::from_user(user),
        Err(_) => SessionStatus::Unauthenticated,
    }
}

/// Fetch project settings, initialize the identity handle, then resolve the
/// current session and publish it on `hub`.
#[cfg(feature = "hydrate")]
pub fn bootstrap_session(hub: AuthHub, identity_app: RwSignal<Option<gate::IdentityApp>>) {
    leptos::task::spawn_local(async move {
        match crate::net::api::fetch_identity_config().await {
            Ok(config) => {
                let app = gate::initialize_app_with(config, hub.clone());
                let _ = identity_app.try_set(Some(app));
            }
            Err(e) => log::warn!("identity config unavailable: {e}"),
        }

        let lookup = crate::net::api::fetch_current_user().await;
        if let Err(e) = &lookup {
            log::warn!("session lookup failed: {e}");
        }
        hub.publish(status_from_lookup(lookup));
    });
}
