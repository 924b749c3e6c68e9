//! Authentication module for the wongnok server.
//!
//! This module provides:
//! - The OIDC adapter over the Keycloak realm (`oidc`)
//! - `AuthService`, which runs the authorization-code flow (`service`)
//! - Login, callback and logout handlers (`routes`)
//! - Bearer token middleware and the claims extractor (`middleware`)
//! - The PostgreSQL user store (`db`)
//!
//! The server keeps no session. Login state lives in a short-lived cookie and
//! every protected request carries its own ID token.

pub mod db;
pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod service;

use std::sync::Arc;
use wongnok_platform_access::TokenVerifier;

use crate::config::StateCookieConfig;
use crate::user::UserService;

pub use middleware::{AuthClaims, authorize, decode_claims};
pub use oidc::{AudienceCheck, OidcClient};
pub use routes::{callback, login, logout};
pub use service::AuthService;

/// Shared application state.
pub struct AppState {
    /// Login flow orchestration.
    pub auth_service: AuthService,
    /// User records.
    pub user_service: UserService,
    /// Verifier for bearer tokens on protected routes.
    pub bearer_verifier: Arc<dyn TokenVerifier>,
    /// Login state cookie settings.
    pub state_cookie: StateCookieConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        auth_service: AuthService,
        user_service: UserService,
        bearer_verifier: Arc<dyn TokenVerifier>,
        state_cookie: StateCookieConfig,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            bearer_verifier,
            state_cookie,
        }
    }
}
