//! REST API helpers for communicating with the server.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs returning errors since these endpoints are only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result` outputs instead of panics so config/session fetch
//! failures degrade to "signed out" without crashing hydration.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use gate::{Identity, IdentityConfig};
#[cfg(feature = "hydrate")]
use serde::Deserialize;

/// Which password flow a credentials form submits to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::SignIn => "/api/auth/sign-in",
            Self::SignUp => "/api/auth/sign-up",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn request_failed_message(what: &str, status: u16) -> String {
    format!("{what} failed: {status}")
}

/// Prefer the server's error code; fall back to the HTTP status.
#[cfg(any(test, feature = "hydrate"))]
fn auth_failed_message(status: u16, code: Option<&str>) -> String {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => code.to_owned(),
        None => request_failed_message("auth request", status),
    }
}

#[cfg(feature = "hydrate")]
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Fetch the identity-service project settings from `/api/config`.
///
/// # Errors
///
/// Returns an error string if the request fails or the server responds with a non-OK status.
pub async fn fetch_identity_config() -> Result<IdentityConfig, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get("/api/config")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(request_failed_message("config request", resp.status()));
        }
        resp.json::<IdentityConfig>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err("not available on server".to_owned())
    }
}

/// Fetch the currently signed-in user from `/api/auth/me`.
/// `Ok(None)` means the server answered "no session".
///
/// # Errors
///
/// Returns an error string when the server cannot tell either way.
pub async fn fetch_current_user() -> Result<Option<Identity>, String> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get("/api/auth/me")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if resp.status() == 401 {
            return Ok(None);
        }
        if !resp.ok() {
            return Err(request_failed_message("session request", resp.status()));
        }
        resp.json::<Identity>().await.map(Some).map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err("not available on server".to_owned())
    }
}

/// Submit email + password to the sign-in or sign-up endpoint.
///
/// # Errors
///
/// Returns the server's error code (e.g. `EMAIL_EXISTS`) or a transport error string.
pub async fn submit_credentials(mode: AuthMode, email: &str, password: &str) -> Result<Identity, String> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = gloo_net::http::Request::post(mode.endpoint())
            .json(&payload)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            let status = resp.status();
            let body = resp.json::<ErrorResponse>().await.ok();
            return Err(auth_failed_message(status, body.as_ref().map(|b| b.error.as_str())));
        }
        resp.json::<Identity>().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (mode, email, password);
        Err("not available on server".to_owned())
    }
}

/// Sign out by calling `POST /api/auth/logout`.
pub async fn logout() {
    #[cfg(feature = "hydrate")]
    {
        let _ = gloo_net::http::Request::post("/api/auth/logout").send().await;
    }
}
