//! User domain type and related structures.
//!
//! A user mirrors the identity provider's account: it is keyed by the OIDC
//! subject and refreshed from the latest claims on every login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wongnok_core::UserId;

use crate::auth::Claims;

/// Avatar assigned to users created from claims.
pub const DEFAULT_IMAGE_URL: &str = "https://avatar.iran.liara.run/public/boy";

/// A user of the recipe platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// OIDC subject claim.
    id: UserId,
    /// Given name from the identity provider.
    first_name: String,
    /// Family name from the identity provider.
    last_name: String,
    /// Display name chosen by the user; defaults to the full name.
    nick_name: String,
    /// Avatar URL.
    image_url: Option<String>,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user from claims on first login.
    #[must_use]
    pub fn from_claims(claims: &Claims) -> Self {
        let now = Utc::now();
        Self {
            id: claims.id.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            nick_name: format!("{} {}", claims.first_name, claims.last_name),
            image_url: Some(DEFAULT_IMAGE_URL.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user with all fields specified.
    ///
    /// Use this when reconstituting a user from storage.
    #[must_use]
    pub fn with_all_fields(
        id: UserId,
        first_name: String,
        last_name: String,
        nick_name: String,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            nick_name,
            image_url,
            created_at,
            updated_at,
        }
    }

    /// Refreshes the provider-owned names, keeping the user's own profile.
    pub fn apply_claims(&mut self, claims: &Claims) {
        self.first_name.clone_from(&claims.first_name);
        self.last_name.clone_from(&claims.last_name);
        self.updated_at = Utc::now();
    }

    /// Replaces the user-owned profile fields.
    pub fn set_profile(&mut self, nick_name: String, image_url: String) {
        self.nick_name = nick_name;
        self.image_url = Some(image_url);
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn nick_name(&self) -> &str {
        &self.nick_name
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Converts the user into its JSON response shape.
    #[must_use]
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id.to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            nick_name: self.nick_name.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
        }
    }
}

/// JSON shape of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub image_url: String,
}

/// Request body for updating the caller's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub image_url: String,
}

impl UserProfileUpdate {
    /// Returns the names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.nick_name.trim().is_empty() {
            missing.push("nickName");
        }
        if self.image_url.trim().is_empty() {
            missing.push("imageUrl");
        }
        missing
    }
}
