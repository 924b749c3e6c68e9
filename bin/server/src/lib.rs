//! wongnok API server.
//!
//! This crate provides the HTTP surface of the wongnok recipe platform:
//! OIDC login against Keycloak, bearer token authorization and the
//! caller's own user profile.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod user;

#[cfg(test)]
mod test_support;
