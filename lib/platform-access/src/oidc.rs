//! Keycloak (OpenID Connect) configuration.
//!
//! This module provides configuration types for connecting to a Keycloak
//! realm used for user authentication, plus the URLs derived from it.

use serde::{Deserialize, Serialize};

/// Configuration for the Keycloak identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeycloakConfig {
    /// The Keycloak base URL (e.g., "https://sso.example.com").
    url: String,
    /// The realm name (e.g., "wongnok").
    realm: String,
    /// The OAuth2 client ID registered with the realm.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URL for the OAuth2 callback
    /// (e.g., "http://localhost:8000/api/v1/callback").
    redirect_url: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email"
    #[serde(default = "default_scopes")]
    scopes: String,
}

fn default_scopes() -> String {
    "openid,profile,email".to_string()
}

impl KeycloakConfig {
    /// Creates a new configuration with default scopes.
    #[must_use]
    pub fn new(
        url: String,
        realm: String,
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Self {
        Self {
            url,
            realm,
            client_id,
            client_secret,
            redirect_url,
            scopes: default_scopes(),
        }
    }

    /// Returns the Keycloak base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the realm name.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URL.
    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the realm URL, which is also the OIDC issuer: `{url}/realms/{realm}`.
    #[must_use]
    pub fn realm_url(&self) -> String {
        format!("{}/realms/{}", self.url, self.realm)
    }

    /// Returns the RP-initiated logout endpoint of the realm.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/protocol/openid-connect/logout", self.realm_url())
    }
}
