//! Client configuration.
//!
//! Values come from the environment once, at process start. Callers that
//! already know their settings (the CLI, tests) build a [`ClientConfig`]
//! directly.

use std::time::Duration;

use mecha_core::error::InvalidInputError;
use mecha_core::{ApiUrl, Result};

/// Environment variable holding the base API origin.
pub const API_URL_ENV: &str = "MECHA_API_URL";

/// Environment variable holding the request timeout in milliseconds.
pub const API_TIMEOUT_ENV: &str = "MECHA_API_TIMEOUT_MS";

/// Environment variable holding the login entry point.
pub const LOGIN_PATH_ENV: &str = "MECHA_LOGIN_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOGIN_PATH: &str = "/signin";

/// Settings shared by every request the client sends.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base origin every endpoint path is resolved against.
    pub api_url: ApiUrl,
    /// Per-attempt timeout. The refresh call uses the same budget.
    pub timeout: Duration,
    /// Where the session terminator sends the user.
    pub login_path: String,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = ApiUrl::new(read(API_URL_ENV).as_deref().unwrap_or(DEFAULT_API_URL))?;

        let timeout_ms = match read(API_TIMEOUT_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|e| InvalidInputError::Config {
                key: API_TIMEOUT_ENV.to_string(),
                reason: format!("'{raw}' is not a number of milliseconds: {e}"),
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };
        if timeout_ms == 0 {
            return Err(InvalidInputError::Config {
                key: API_TIMEOUT_ENV.to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let login_path = read(LOGIN_PATH_ENV).unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());

        Ok(Self {
            api_url,
            timeout: Duration::from_millis(timeout_ms),
            login_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.login_path, "/signin");
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.mecha.vn"),
            (API_TIMEOUT_ENV, "5000"),
            (LOGIN_PATH_ENV, "/login"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host(), Some("api.mecha.vn"));
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(API_TIMEOUT_ENV, "  ")])).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = ClientConfig::from_lookup(lookup(&[(API_TIMEOUT_ENV, "0")]));
        assert!(result.is_err(), "timeout of 0 must be rejected");
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[(API_TIMEOUT_ENV, "30s")])).unwrap_err();
        assert!(err.to_string().contains(API_TIMEOUT_ENV), "got: {err}");
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "localhost:8080")])).is_err());
    }
}
