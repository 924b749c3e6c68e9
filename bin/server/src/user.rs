//! User collaborator: keeps local user records in sync with identity
//! provider claims and serves the caller's own profile.

use async_trait::async_trait;
use axum::{Json, extract::State};
use rootcause::Report;
use std::sync::Arc;
use tracing::{debug, instrument};
use wongnok_core::UserId;
use wongnok_platform_access::{Claims, User, UserError, UserProfileUpdate, UserResponse};

use crate::auth::{AppState, AuthClaims};
use crate::error::ApiError;

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: &UserId) -> wongnok_core::Result<Option<User>, UserError>;

    /// Creates the user, or replaces the record with the same ID.
    async fn upsert(&self, user: &User) -> wongnok_core::Result<(), UserError>;
}

/// User business rules on top of a `UserStore`.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates or refreshes the user described by `claims`.
    ///
    /// Claims must be complete; nothing is written otherwise. An existing
    /// user keeps their nick name, image and creation time.
    #[instrument(skip_all, fields(user_id = %claims.id))]
    pub async fn upsert_with_claims(&self, claims: &Claims) -> Result<User, Report<UserError>> {
        let missing = claims.missing_fields();
        if !missing.is_empty() {
            return Err(UserError::InvalidClaims {
                reason: format!("missing {}", missing.join(", ")),
            }
            .into());
        }

        let user = match self.store.find_by_id(&claims.id).await? {
            Some(mut existing) => {
                existing.apply_claims(claims);
                existing
            }
            None => {
                debug!("creating user from claims");
                User::from_claims(claims)
            }
        };

        self.store.upsert(&user).await?;
        Ok(user)
    }

    /// Returns the user with the given ID.
    pub async fn get(&self, id: &UserId) -> Result<User, Report<UserError>> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound { id: id.clone() }.into())
    }

    /// Updates the caller's nick name and image.
    #[instrument(skip_all, fields(user_id = %claims.id))]
    pub async fn update_profile(
        &self,
        claims: &Claims,
        update: UserProfileUpdate,
    ) -> Result<User, Report<UserError>> {
        let missing = update.missing_fields();
        if !missing.is_empty() {
            return Err(UserError::InvalidProfile {
                reason: format!("missing {}", missing.join(", ")),
            }
            .into());
        }

        let mut user = self.get(&claims.id).await?;
        user.set_profile(update.nick_name, update.image_url);
        self.store.upsert(&user).await?;
        Ok(user)
    }
}

/// Returns the authenticated caller's user record.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get(&claims.id).await?;
    Ok(Json(user.to_response()))
}

/// Updates the authenticated caller's profile.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthClaims(claims): AuthClaims,
    Json(update): Json<UserProfileUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.update_profile(&claims, update).await?;
    Ok(Json(user.to_response()))
}
