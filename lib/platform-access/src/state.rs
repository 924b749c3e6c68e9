//! CSRF state generation for the authorization-code flow.

use oauth2::CsrfToken;

/// Number of random bytes behind each state value (256 bits).
pub const STATE_BYTES: u32 = 32;

/// Generates a fresh, URL-safe state value.
///
/// The value is 32 bytes from a cryptographically secure generator, encoded
/// as unpadded base64url (43 characters). Collisions are not checked.
#[must_use]
pub fn generate_state() -> String {
    CsrfToken::new_random_len(STATE_BYTES).secret().clone()
}
