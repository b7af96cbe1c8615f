//! Hosted identity-service REST client.
//!
//! Thin HTTP wrapper for the `accounts:*` endpoints: password sign-in,
//! sign-up, and ID-token lookup. Credential checks, token issuance and
//! session persistence all happen on the identity service; this module only
//! moves requests and maps answers. Pure parsing lives in `parse_*` helpers
//! for testability.

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

use std::time::Duration;

use gate::{Identity, IdentityConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Error codes the lookup endpoint uses for a token that no longer names a session.
const SIGNED_OUT_CODES: [&str; 4] = ["INVALID_ID_TOKEN", "TOKEN_EXPIRED", "USER_NOT_FOUND", "USER_DISABLED"];

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP client could not be constructed.
    #[error("identity http client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never got an answer.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The identity service refused the request (bad credentials, email taken, ...).
    #[error("identity service rejected request: {code}")]
    Rejected { status: u16, code: String },

    /// The identity service answered with something we cannot read.
    #[error("identity response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Credentials-bearing session established with the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub id_token: String,
    pub expires_in_secs: i64,
    pub identity: Identity,
}

/// Identity-service operations the host needs. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Resolve an ID token to its user. `Ok(None)` means the token no longer
    /// names a live session.
    ///
    /// # Errors
    ///
    /// Returns an [`IdentityError`] when the service cannot be reached or
    /// answers unexpectedly.
    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, IdentityError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Rejected`] for refused credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError>;

    /// Create an account with email and password; the new account is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Rejected`] when the service refuses the account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Build a client for the project in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig, base_url: &str) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build a client using `IDENTITY_BASE_URL` (default: the hosted service).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_env(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let base_url = std::env::var("IDENTITY_BASE_URL").unwrap_or_else(|_| DEFAULT_IDENTITY_BASE_URL.to_owned());
        Self::new(config, &base_url)
    }

    async fn post<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<(u16, String), IdentityError> {
        let response = self
            .http
            .post(endpoint(&self.base_url, method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        Ok((status, text))
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let (status, text) = self.post(method, &body).await?;
        if status != 200 {
            return Err(IdentityError::Rejected { status, code: parse_error_code(&text) });
        }
        parse_signed_in(&text)
    }
}

#[async_trait::async_trait]
impl IdentityApi for IdentityClient {
    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, IdentityError> {
        let (status, text) = self.post("accounts:lookup", &LookupRequest { id_token }).await?;
        if status == 200 {
            return parse_lookup(&text);
        }
        let code = parse_error_code(&text);
        if status == 400 && SIGNED_OUT_CODES.contains(&code.as_str()) {
            return Ok(None);
        }
        Err(IdentityError::Rejected { status, code })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        self.password_call("accounts:signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        self.password_call("accounts:signUp", email, password).await
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn endpoint(base_url: &str, method: &str) -> String {
    format!("{base_url}/{method}")
}

/// Session lifetime used when the service omits or garbles `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

fn parse_signed_in(text: &str) -> Result<SignedIn, IdentityError> {
    let resp: PasswordResponse = serde_json::from_str(text).map_err(|e| IdentityError::Parse(e.to_string()))?;
    let expires_in_secs = resp
        .expires_in
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Ok(SignedIn {
        id_token: resp.id_token,
        expires_in_secs,
        identity: Identity {
            uid: resp.local_id,
            email: resp.email.filter(|e| !e.is_empty()),
            display_name: resp.display_name.filter(|n| !n.is_empty()),
            email_verified: false,
        },
    })
}

fn parse_lookup(text: &str) -> Result<Option<Identity>, IdentityError> {
    let resp: LookupResponse = serde_json::from_str(text).map_err(|e| IdentityError::Parse(e.to_string()))?;
    Ok(resp.users.into_iter().next().map(|user| Identity {
        uid: user.local_id,
        email: user.email.filter(|e| !e.is_empty()),
        display_name: user.display_name.filter(|n| !n.is_empty()),
        email_verified: user.email_verified,
    }))
}

/// Extract the leading error code from an error body such as
/// `{"error":{"message":"TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"}}`.
fn parse_error_code(text: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(text)
        .ok()
        .and_then(|env| {
            env.error
                .message
                .split_whitespace()
                .next()
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "UNKNOWN".to_owned())
}

// =============================================================================
// TEST HELPERS
// =============================================================================
