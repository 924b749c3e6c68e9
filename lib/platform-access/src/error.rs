//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: failures along the login/callback/logout pipeline
//! - `AuthorizationError`: bearer-protected requests without usable claims
//! - `ProviderError`: raw failures reported by an identity provider adapter
//! - `UserError`: failures in the user collaborator
//!
//! Display strings carry the pipeline stage as a prefix so a message surfaced
//! to a client identifies where the flow stopped.

use std::fmt;
use wongnok_core::UserId;

/// Error reported by an identity provider capability.
///
/// Adapters flatten transport, protocol and cryptographic failures into a
/// single message; callers wrap it with the stage that invoked the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    reason: String,
}

impl ProviderError {
    /// Creates a provider error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ProviderError {}

/// Errors from the authentication flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Callback state cookie absent or different from the query state.
    InvalidState,
    /// The provider rejected or could not process the authorization code.
    ExchangeFailed { reason: String },
    /// The token response carried no usable `id_token`.
    MissingIdToken,
    /// ID token signature, issuer, audience or expiry check failed.
    VerificationFailed { reason: String },
    /// A verified payload could not be decoded into the expected claims.
    ClaimsDecodeFailed { reason: String },
    /// The configured logout URL could not be parsed.
    LogoutUrl { reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState => write!(f, "Invalid state"),
            Self::ExchangeFailed { reason } => write!(f, "exchange token: {reason}"),
            Self::MissingIdToken => write!(f, "id token is missing"),
            Self::VerificationFailed { reason } => write!(f, "verify token: {reason}"),
            Self::ClaimsDecodeFailed { reason } => write!(f, "decode claims: {reason}"),
            Self::LogoutUrl { reason } => write!(f, "parse logout url: {reason}"),
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization of bearer-protected requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No bearer token, malformed header, or no claims in the request context.
    Unauthorized,
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from the user collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// Claims failed validation before any write.
    InvalidClaims { reason: String },
    /// A profile update request failed validation.
    InvalidProfile { reason: String },
    /// No user exists for the given ID.
    NotFound { id: UserId },
    /// Reading a user record failed.
    FindFailed { details: String },
    /// Writing a user record failed.
    UpsertFailed { details: String },
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClaims { reason } => write!(f, "claims invalid: {reason}"),
            Self::InvalidProfile { reason } => write!(f, "profile invalid: {reason}"),
            Self::NotFound { id } => write!(f, "user '{id}' not found"),
            Self::FindFailed { details } => write!(f, "find user: {details}"),
            Self::UpsertFailed { details } => write!(f, "upsert user: {details}"),
        }
    }
}

impl std::error::Error for UserError {}
