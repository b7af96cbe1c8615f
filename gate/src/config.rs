//! Identity-service project configuration.
//!
//! The configuration is supplied at start-up from the environment rather than
//! embedded in the build. Serde uses the camelCase keys hosted identity SDKs
//! expect, so the same payload can be handed to the browser as-is.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ENV_API_KEY: &str = "IDENTITY_API_KEY";
pub const ENV_AUTH_DOMAIN: &str = "IDENTITY_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "IDENTITY_PROJECT_ID";
pub const ENV_STORAGE_BUCKET: &str = "IDENTITY_STORAGE_BUCKET";
pub const ENV_MESSAGING_SENDER_ID: &str = "IDENTITY_MESSAGING_SENDER_ID";
pub const ENV_APP_ID: &str = "IDENTITY_APP_ID";
pub const ENV_MEASUREMENT_ID: &str = "IDENTITY_MEASUREMENT_ID";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required identity setting: {var}")]
    Missing { var: &'static str },
}

/// Project settings for the hosted identity service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl IdentityConfig {
    /// Build a config from the required fields; the rest take project defaults.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        messaging_sender_id: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        Self {
            api_key: api_key.into(),
            auth_domain: default_auth_domain(&project_id),
            storage_bucket: default_storage_bucket(&project_id),
            project_id,
            messaging_sender_id: messaging_sender_id.into(),
            app_id: app_id.into(),
            measurement_id: None,
        }
    }

    /// Load from `IDENTITY_*` environment variables.
    ///
    /// Required: `IDENTITY_API_KEY`, `IDENTITY_PROJECT_ID`,
    /// `IDENTITY_MESSAGING_SENDER_ID`, `IDENTITY_APP_ID`.
    ///
    /// Optional: `IDENTITY_AUTH_DOMAIN` (default `<project>.firebaseapp.com`),
    /// `IDENTITY_STORAGE_BUCKET` (default `<project>.firebasestorage.app`),
    /// `IDENTITY_MEASUREMENT_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Values are trimmed and empty
    /// values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent required variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing { var: key });

        let api_key = require(ENV_API_KEY)?;
        let project_id = require(ENV_PROJECT_ID)?;
        let messaging_sender_id = require(ENV_MESSAGING_SENDER_ID)?;
        let app_id = require(ENV_APP_ID)?;

        Ok(Self {
            api_key,
            auth_domain: get(ENV_AUTH_DOMAIN).unwrap_or_else(|| default_auth_domain(&project_id)),
            storage_bucket: get(ENV_STORAGE_BUCKET).unwrap_or_else(|| default_storage_bucket(&project_id)),
            project_id,
            messaging_sender_id,
            app_id,
            measurement_id: get(ENV_MEASUREMENT_ID),
        })
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("measurement_id", &self.measurement_id)
            .finish()
    }
}

fn default_auth_domain(project_id: &str) -> String {
    format!("{project_id}.firebaseapp.com")
}

fn default_storage_bucket(project_id: &str) -> String {
    format!("{project_id}.firebasestorage.app")
}
