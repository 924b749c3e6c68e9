//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! `__` as separator, e.g. `KEYCLOAK__CLIENT_ID` or `STATE_COOKIE__SECURE`.
//!
//! See [`KeycloakConfig`](wongnok_platform_access::KeycloakConfig) for the
//! identity provider settings.

use serde::Deserialize;
use std::time::Duration;
use wongnok_platform_access::KeycloakConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path prefix for every API route.
    #[serde(default = "default_api_base_path")]
    pub api_base_path: String,

    /// Keycloak realm and client configuration.
    pub keycloak: KeycloakConfig,

    /// Login state cookie configuration.
    #[serde(default)]
    pub state_cookie: StateCookieConfig,

    /// Outbound HTTP configuration for identity provider calls.
    #[serde(default)]
    pub http: HttpClientConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_api_base_path() -> String {
    "/api/v1".to_string()
}

/// Settings for the cookie that carries the login state across the redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct StateCookieConfig {
    /// Whether to set the Secure flag (requires HTTPS).
    /// Defaults to false so the flow works over plain HTTP during development.
    #[serde(default)]
    pub secure: bool,

    /// Optional Domain attribute.
    #[serde(default)]
    pub domain: Option<String>,

    /// Cookie lifetime in seconds.
    #[serde(default = "default_state_max_age_seconds")]
    pub max_age_seconds: i64,
}

fn default_state_max_age_seconds() -> i64 {
    300
}

impl Default for StateCookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            domain: None,
            max_age_seconds: default_state_max_age_seconds(),
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpClientConfig {
    /// Timeout for discovery and token exchange requests, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl HttpClientConfig {
    /// Returns the timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
