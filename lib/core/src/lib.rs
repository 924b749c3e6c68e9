//! Core domain types and utilities for the wongnok recipe platform.
//!
//! This crate provides the foundational types and error handling shared
//! by the platform-access library and the HTTP server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::UserId;
