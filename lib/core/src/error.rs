//! Shared result type for wongnok.
//!
//! Domain errors (`UserError`, `AuthenticationError`, ...) live next to the
//! code that raises them. Fallible storage and service calls wrap them in a
//! rootcause `Report` so callers can inspect the typed context.

use rootcause::Report;

/// Result carrying a `Report` with context type `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
