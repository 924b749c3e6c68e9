//! Platform access and authentication for wongnok.
//!
//! This crate provides:
//! - Keycloak configuration (`KeycloakConfig`) and its derived URLs
//! - CSRF state generation for the authorization-code flow
//! - Identity provider capabilities (`AuthorizeUrlBuilder`, `CodeExchanger`, `TokenVerifier`)
//! - Authentication data (`Claims`, `Credential`) and the `User` entity
//! - Authentication, authorization and user error types
//!
//! # Example
//!
//! ```
//! use wongnok_platform_access::{Claims, KeycloakConfig, User, VerifiedToken};
//!
//! let config = KeycloakConfig::new(
//!     "https://sso.example.com".to_string(),
//!     "wongnok".to_string(),
//!     "wongnok".to_string(),
//!     "secret".to_string(),
//!     "http://localhost:8000/api/v1/callback".to_string(),
//! );
//! assert_eq!(config.realm_url(), "https://sso.example.com/realms/wongnok");
//!
//! // Claims decoded from a verified ID token payload
//! let token = VerifiedToken::new(serde_json::json!({
//!     "sub": "u1",
//!     "given_name": "Somchai",
//!     "family_name": "Jaidee",
//! }));
//! let claims: Claims = token.decode_claims().unwrap();
//!
//! let user = User::from_claims(&claims);
//! assert_eq!(user.nick_name(), "Somchai Jaidee");
//! ```

pub mod auth;
pub mod error;
pub mod oidc;
pub mod provider;
pub mod state;
pub mod user;

// Re-export main types at crate root
pub use auth::{CallbackQuery, Claims, Credential, CredentialResponse, LogoutQuery};
pub use error::{AuthenticationError, AuthorizationError, ProviderError, UserError};
pub use oidc::KeycloakConfig;
pub use provider::{
    AuthorizeUrlBuilder, CodeExchanger, ProviderToken, TokenVerifier, VerifiedToken,
};
pub use state::generate_state;
pub use user::{User, UserProfileUpdate, UserResponse};
