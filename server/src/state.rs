//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the identity-service project configuration, the client used to
//! reach the hosted identity service, and the route table shared with the
//! Leptos front-end. Session status on the server is per request
//! (`RequestIdentity`), so no process-wide auth hub is kept here.

use std::sync::Arc;

use gate::{IdentityConfig, Navigator};

use crate::routes::auth::cookie_secure;
use crate::services::identity::IdentityApi;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub identity_config: Arc<IdentityConfig>,
    pub identity: Arc<dyn IdentityApi>,
    /// Route table and guard template; forked per request.
    pub navigator: Navigator,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl AppState {
    #[must_use]
    pub fn new(identity_config: IdentityConfig, identity: Arc<dyn IdentityApi>) -> Self {
        Self {
            identity_config: Arc::new(identity_config),
            identity,
            navigator: Navigator::default(),
            secure_cookies: cookie_secure(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
