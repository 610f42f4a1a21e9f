// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use crate::services::crypto::PasswordTransport;
use crate::views::redemption::RedemptionFailureBehavior;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default API base URL (the backend mounts every blueprint under `/api`).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Pre-shared secret the backend uses to decrypt obscured passwords.
pub const DEFAULT_PASSWORD_SECRET: &str = "eternalmoon";

/// Which of the two client applications this process acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppVariant {
    /// Administrative dashboard: requires an admin-flagged session.
    Admin,
    /// Consumer rewards catalog: any authenticated user.
    Consumer,
}

impl FromStr for AppVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(AppVariant::Admin),
            "consumer" | "user" => Ok(AppVariant::Consumer),
            _ => Err(ConfigError::Invalid("APP_VARIANT", s.to_string())),
        }
    }
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every API path is resolved against
    pub api_base_url: String,
    /// Application variant (admin dashboard or consumer app)
    pub variant: AppVariant,
    /// File backing the persisted session
    pub session_path: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// How passwords travel to the login/register endpoints
    pub password_transport: PasswordTransport,
    /// Pre-shared secret for the obscured password transport
    pub password_secret: String,
    /// What the redemption dialog does when the redeem call fails
    pub redemption_failure: RedemptionFailureBehavior,
    /// Public URL of the consumer app, used for invite links
    pub invite_base_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            variant: AppVariant::Consumer,
            session_path: env::temp_dir().join("point-rewards-test-session.json"),
            request_timeout_secs: 10,
            password_transport: PasswordTransport::Obscured,
            password_secret: DEFAULT_PASSWORD_SECRET.to_string(),
            redemption_failure: RedemptionFailureBehavior::ResetSilently,
            invite_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let variant = match env::var("APP_VARIANT") {
            Ok(v) => v.parse()?,
            Err(_) => AppVariant::Consumer,
        };

        let session_path = match env::var("SESSION_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_session_path(variant)?,
        };

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS", v))?,
            Err(_) => 10,
        };

        let password_transport = match env::var("PASSWORD_TRANSPORT") {
            Ok(v) => v.parse()?,
            Err(_) => PasswordTransport::Obscured,
        };

        let redemption_failure = match env::var("REDEMPTION_FAILURE") {
            Ok(v) => v.parse()?,
            Err(_) => RedemptionFailureBehavior::ResetSilently,
        };

        Ok(Self {
            api_base_url,
            variant,
            session_path,
            request_timeout_secs,
            password_transport,
            password_secret: env::var("PASSWORD_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_PASSWORD_SECRET.to_string()),
            redemption_failure,
            invite_base_url: env::var("INVITE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Switch variant. The session file follows unless `SESSION_PATH` pins it.
    pub fn with_variant(mut self, variant: AppVariant) -> Result<Self, ConfigError> {
        if variant != self.variant && env::var("SESSION_PATH").is_err() {
            self.session_path = default_session_path(variant)?;
        }
        self.variant = variant;
        Ok(self)
    }

    /// Override the API base URL (`--server`).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Origin that server-relative asset paths (`/static/...`) live under.
    pub fn asset_origin(&self) -> &str {
        self.api_base_url
            .strip_suffix("/api")
            .unwrap_or(&self.api_base_url)
    }
}

/// Admin and consumer sessions live in separate files so both apps can be
/// signed in on one machine.
fn default_session_path(variant: AppVariant) -> Result<PathBuf, ConfigError> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| ConfigError::Missing("SESSION_PATH"))?;
    let file = match variant {
        AppVariant::Admin => "admin-session.json",
        AppVariant::Consumer => "session.json",
    };
    Ok(PathBuf::from(home).join(".point-rewards").join(file))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
