// src/config.rs

//! Configuration loading utilities.
//!
//! Settings come from `config.toml`; secrets come from the environment,
//! optionally seeded from a `.env` file in the working directory.

use std::env;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Transport credentials and sender identity.
#[derive(Clone)]
pub struct Credentials {
    /// Transport API key
    pub api_key: String,
    /// Sender identity, e.g. `"Jane <jane@startup.io>"`
    pub from_email: String,
    /// Default recipient for test mode
    pub test_email: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("test_email", &self.test_email)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read credentials through an arbitrary key lookup.
    ///
    /// `API_KEY` falls back to `RESEND_API_KEY`. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("API_KEY")
            .or_else(|| get("RESEND_API_KEY"))
            .ok_or_else(|| AppError::config("API_KEY is not set"))?;
        let from_email =
            get("FROM_EMAIL").ok_or_else(|| AppError::config("FROM_EMAIL is not set"))?;

        Ok(Self {
            api_key,
            from_email,
            test_email: get("TEST_EMAIL"),
        })
    }

    /// Pick the test recipient: explicit override first, then `TEST_EMAIL`.
    pub fn resolve_test_email(&self, override_email: Option<&str>) -> Result<String> {
        override_email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .or_else(|| self.test_email.clone())
            .ok_or_else(|| {
                AppError::config("TEST_EMAIL not configured; set it in .env or pass --test-email")
            })
    }
}

/// Load `.env` if present. Missing files are not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Failed to read .env: {e}"),
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing or invalid.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Config::default();
    }
    Config::load_or_default(path)
}
