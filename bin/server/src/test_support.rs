//! In-memory fakes for the identity provider and the user store.

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wongnok_core::UserId;
use wongnok_platform_access::{
    AuthorizeUrlBuilder, CodeExchanger, KeycloakConfig, ProviderError, ProviderToken,
    TokenVerifier, User, UserError, VerifiedToken,
};

use crate::auth::{AppState, AuthService};
use crate::config::StateCookieConfig;
use crate::user::{UserService, UserStore};

pub fn keycloak_config(url: &str) -> KeycloakConfig {
    KeycloakConfig::new(
        url.to_string(),
        "demo".to_string(),
        "wongnok".to_string(),
        "secret".to_string(),
        "http://localhost:8000/api/v1/callback".to_string(),
    )
}

pub fn verified_claims(sub: &str, given_name: &str, family_name: &str) -> VerifiedToken {
    VerifiedToken::new(json!({
        "iss": "http://example.com/realms/demo",
        "sub": sub,
        "given_name": given_name,
        "family_name": family_name,
    }))
}

/// Identity provider fake implementing all three capabilities.
#[derive(Default)]
pub struct FakeProvider {
    token: Option<ProviderToken>,
    exchange_error: Option<String>,
    verified: Option<VerifiedToken>,
    verify_error: Option<String>,
    pub exchange_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    codes: Mutex<Vec<String>>,
    raw_tokens: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_token(token: ProviderToken) -> Self {
        Self {
            token: Some(token),
            ..Self::default()
        }
    }

    pub fn with_verified(verified: VerifiedToken) -> Self {
        Self {
            verified: Some(verified),
            ..Self::default()
        }
    }

    pub fn failing_exchange(reason: &str) -> Self {
        Self {
            exchange_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_verify(reason: &str) -> Self {
        Self {
            verify_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn and_verified(mut self, verified: VerifiedToken) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn and_failing_verify(mut self, reason: &str) -> Self {
        self.verify_error = Some(reason.to_string());
        self
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }

    pub fn verified_tokens(&self) -> Vec<String> {
        self.raw_tokens.lock().unwrap().clone()
    }
}

impl AuthorizeUrlBuilder for FakeProvider {
    fn auth_code_url(&self, state: &str) -> String {
        format!("http://example.com/auth?state={state}")
    }
}

#[async_trait]
impl CodeExchanger for FakeProvider {
    async fn exchange(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.codes.lock().unwrap().push(code.to_string());

        if let Some(reason) = &self.exchange_error {
            return Err(ProviderError::new(reason.clone()));
        }
        self.token
            .clone()
            .ok_or_else(|| ProviderError::new("no token configured"))
    }
}

#[async_trait]
impl TokenVerifier for FakeProvider {
    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedToken, ProviderError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.raw_tokens.lock().unwrap().push(raw_id_token.to_string());

        if let Some(reason) = &self.verify_error {
            return Err(ProviderError::new(reason.clone()));
        }
        self.verified
            .clone()
            .ok_or_else(|| ProviderError::new("no verified token configured"))
    }
}

/// User store fake recording every upsert.
#[derive(Default)]
pub struct FakeUserStore {
    users: Mutex<HashMap<UserId, User>>,
    upserts: Mutex<Vec<User>>,
    fail_find: Option<String>,
    fail_upsert: Option<String>,
}

impl FakeUserStore {
    pub fn with_user(user: User) -> Self {
        let store = Self::default();
        store.users.lock().unwrap().insert(user.id().clone(), user);
        store
    }

    pub fn failing_find(details: &str) -> Self {
        Self {
            fail_find: Some(details.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_upsert(details: &str) -> Self {
        Self {
            fail_upsert: Some(details.to_string()),
            ..Self::default()
        }
    }

    pub fn upserts(&self) -> Vec<User> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn find_by_id(&self, id: &UserId) -> wongnok_core::Result<Option<User>, UserError> {
        if let Some(details) = &self.fail_find {
            return Err(UserError::FindFailed {
                details: details.clone(),
            }
            .into());
        }
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn upsert(&self, user: &User) -> wongnok_core::Result<(), UserError> {
        if let Some(details) = &self.fail_upsert {
            return Err(UserError::UpsertFailed {
                details: details.clone(),
            }
            .into());
        }
        self.upserts.lock().unwrap().push(user.clone());
        self.users
            .lock()
            .unwrap()
            .insert(user.id().clone(), user.clone());
        Ok(())
    }
}

/// Wires fakes into an `AppState`.
///
/// `provider` serves the login flow; `bearer` verifies caller-presented tokens.
pub fn app_state(
    provider: Arc<FakeProvider>,
    bearer: Arc<FakeProvider>,
    store: Arc<FakeUserStore>,
) -> Arc<AppState> {
    app_state_with_cookie(provider, bearer, store, StateCookieConfig::default())
}

pub fn app_state_with_cookie(
    provider: Arc<FakeProvider>,
    bearer: Arc<FakeProvider>,
    store: Arc<FakeUserStore>,
    state_cookie: StateCookieConfig,
) -> Arc<AppState> {
    let auth_service = AuthService::new(
        keycloak_config("http://example.com"),
        provider.clone(),
        provider.clone(),
        provider,
    );
    Arc::new(AppState::new(
        auth_service,
        UserService::new(store),
        bearer,
        state_cookie,
    ))
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
