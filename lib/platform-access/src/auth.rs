//! Authentication data carried through the login flow.
//!
//! - `Claims`: identity attributes decoded from a verified ID token
//! - `Credential`: the result of a successful code exchange
//! - `CallbackQuery` / `LogoutQuery`: query strings of the protocol endpoints

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use wongnok_core::UserId;

use crate::provider::ProviderToken;

/// Claims extracted from a verified OIDC ID token.
///
/// Rebuilt on every authenticated request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The subject claim, used as the user's primary key.
    #[serde(rename = "sub")]
    pub id: UserId,
    /// The `given_name` claim.
    #[serde(rename = "given_name")]
    pub first_name: String,
    /// The `family_name` claim.
    #[serde(rename = "family_name")]
    pub last_name: String,
}

impl Claims {
    /// Creates a claims record.
    #[must_use]
    pub fn new(id: impl Into<UserId>, first_name: String, last_name: String) -> Self {
        Self {
            id: id.into(),
            first_name,
            last_name,
        }
    }

    /// Returns the names of required claims that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_empty() {
            missing.push("sub");
        }
        if self.first_name.is_empty() {
            missing.push("given_name");
        }
        if self.last_name.is_empty() {
            missing.push("family_name");
        }
        missing
    }
}

/// Tokens issued by a successful authorization-code exchange.
///
/// Never persisted; it is serialized into the callback response and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    token_type: String,
    refresh_token: Option<String>,
    expiry: Option<DateTime<Utc>>,
    expires_in: u64,
    id_token: String,
}

impl Credential {
    /// Builds a credential from a token response and its extracted ID token.
    ///
    /// `issued_at` anchors the absolute expiry computed from `expires_in`.
    #[must_use]
    pub fn from_token(token: ProviderToken, id_token: String, issued_at: DateTime<Utc>) -> Self {
        let expires_in = token.expires_in.unwrap_or_default();
        let expiry = token
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
            .map(|delta| issued_at + delta);

        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expiry,
            expires_in,
            id_token,
        }
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the raw ID token (JWT).
    #[must_use]
    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    /// Converts the credential into its JSON response shape.
    #[must_use]
    pub fn to_response(&self) -> CredentialResponse {
        CredentialResponse {
            access_token: self.access_token.clone(),
            token_type: Some(self.token_type.clone()).filter(|t| !t.is_empty()),
            refresh_token: self.refresh_token.clone().filter(|t| !t.is_empty()),
            expiry: self.expiry,
            expires_in: self.expires_in,
            id_token: self.id_token.clone(),
        }
    }
}

/// JSON body returned by a successful callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub expires_in: u64,
    pub id_token: String,
}

/// Query parameters of the OIDC callback.
///
/// Absent parameters decode as empty strings so that a bare callback is
/// rejected by the state check rather than by query parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
}

/// Query parameters of the logout endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutQuery {
    #[serde(default, rename = "idTokenHint")]
    pub id_token_hint: String,
    #[serde(default, rename = "postLogoutRedirectUri")]
    pub post_logout_redirect_uri: String,
}
