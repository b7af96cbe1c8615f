//! `GET /api/config` — identity-service project settings for the browser.
//!
//! The browser initializes its identity handle from this document instead of
//! carrying settings in the bundle. Every field here is public by nature of
//! the hosted service (the web API key identifies the project, it does not
//! authorize anything).

use axum::Json;
use axum::extract::State;
use gate::IdentityConfig;

use crate::state::AppState;

pub async fn identity_config(State(state): State<AppState>) -> Json<IdentityConfig> {
    Json(IdentityConfig::clone(&state.identity_config))
}
