//! Auth routes — password sign-in/sign-up, session cookie, current user.
//!
//! The hosted identity service owns credentials and issues ID tokens. These
//! handlers relay credentials, keep the returned ID token in an HttpOnly
//! cookie, and answer "who am I" for the browser bootstrap.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gate::Identity;
use serde::Deserialize;
use time::Duration;

use crate::services::identity::{IdentityApi, IdentityError, SignedIn};
use crate::state::AppState;

/// Cookie holding the identity-service ID token.
pub const SESSION_COOKIE: &str = "__session";

/// Minimum password length accepted by the identity service.
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("PUBLIC_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

/// Read the session token from a cookie jar; blank values count as absent.
pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|token| !token.trim().is_empty())
        .map(str::to_owned)
}

fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub identity: Identity,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let identity = app_state
            .identity
            .lookup(&token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::BAD_GATEWAY
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { identity })
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Reject credentials the identity service would refuse anyway. Returns the
/// identity-service style error code.
pub(crate) fn validate_credentials(creds: &Credentials) -> Result<(), &'static str> {
    let email = creds.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("INVALID_EMAIL");
    }
    if creds.password.is_empty() {
        return Err("MISSING_PASSWORD");
    }
    if creds.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("WEAK_PASSWORD");
    }
    Ok(())
}

fn error_body(status: StatusCode, code: &str) -> Response {
    (status, Json(serde_json::json!({ "error": code }))).into_response()
}

fn identity_failure(err: &IdentityError, rejected: StatusCode) -> Response {
    match err {
        IdentityError::Rejected { code, .. } => error_body(rejected, code),
        other => {
            tracing::error!(error = %other, "identity service call failed");
            error_body(StatusCode::BAD_GATEWAY, "IDENTITY_UNAVAILABLE")
        }
    }
}

fn signed_in_response(signed_in: SignedIn, secure: bool) -> Response {
    let cookie = session_cookie(signed_in.id_token, Duration::seconds(signed_in.expires_in_secs), secure);
    (CookieJar::new().add(cookie), Json(signed_in.identity)).into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordFlow {
    SignIn,
    SignUp,
}

impl PasswordFlow {
    /// Status used when the identity service refuses the request.
    fn rejected_status(self) -> StatusCode {
        match self {
            Self::SignIn => StatusCode::UNAUTHORIZED,
            Self::SignUp => StatusCode::BAD_REQUEST,
        }
    }
}

async fn password_flow(state: &AppState, creds: Credentials, flow: PasswordFlow) -> Response {
    if let Err(code) = validate_credentials(&creds) {
        return error_body(StatusCode::BAD_REQUEST, code);
    }
    let email = creds.email.trim();
    let result = match flow {
        PasswordFlow::SignIn => state.identity.sign_in(email, &creds.password).await,
        PasswordFlow::SignUp => state.identity.sign_up(email, &creds.password).await,
    };
    match result {
        Ok(signed_in) => {
            tracing::info!(uid = %signed_in.identity.uid, ?flow, "session established");
            signed_in_response(signed_in, state.secure_cookies)
        }
        Err(e) => identity_failure(&e, flow.rejected_status()),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/sign-in` — password sign-in, set session cookie.
pub async fn sign_in(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    password_flow(&state, creds, PasswordFlow::SignIn).await
}

/// `POST /api/auth/sign-up` — create an account, set session cookie.
pub async fn sign_up(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    password_flow(&state, creds, PasswordFlow::SignUp).await
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<Identity> {
    Json(auth.identity)
}

/// `POST /api/auth/logout` — clear the session cookie.
///
/// Succeeds without a session so a stale browser can always sign out.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = session_cookie(String::new(), Duration::ZERO, state.secure_cookies);
    (CookieJar::new().add(cookie), StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
