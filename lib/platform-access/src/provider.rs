//! Identity provider capabilities.
//!
//! The authentication flow depends on three narrow capabilities rather than a
//! concrete OIDC client, so the server can plug in the openidconnect adapter
//! in production and in-memory fakes in tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::auth::Claims;
use crate::error::{AuthenticationError, ProviderError};

/// Builds the provider's authorization URL for a login attempt.
pub trait AuthorizeUrlBuilder: Send + Sync {
    /// Returns the authorization URL carrying `state` verbatim.
    fn auth_code_url(&self, state: &str) -> String;
}

/// Exchanges an authorization code at the provider's token endpoint.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    /// Performs the code-for-token exchange.
    async fn exchange(&self, code: &str) -> Result<ProviderToken, ProviderError>;
}

/// Verifies a raw ID token against the provider's published keys.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Checks signature, issuer and expiry (and audience, if configured).
    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedToken, ProviderError>;
}

/// Token endpoint response.
///
/// Fields outside the core OAuth2 set, such as `id_token` or `scope`, are kept
/// in the `extra` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderToken {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub extra: Map<String, Value>,
}

impl ProviderToken {
    /// Creates a token with only an access token set.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Adds an extension field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns an extension field, if present.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Payload of an ID token whose signature, issuer and expiry were checked.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    payload: Value,
}

impl VerifiedToken {
    /// Wraps an already-verified claims payload.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Deserializes the payload into any claims shape.
    pub fn claims<T: DeserializeOwned>(&self) -> Result<T, AuthenticationError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            AuthenticationError::ClaimsDecodeFailed {
                reason: e.to_string(),
            }
        })
    }

    /// Decodes the identity claims used by the platform.
    pub fn decode_claims(&self) -> Result<Claims, AuthenticationError> {
        self.claims()
    }
}
