//! Authentication orchestration: state, authorization URL, code exchange,
//! ID token verification and logout URL construction.
//!
//! The service holds no per-request state. It talks to the identity
//! provider only through the capability traits, so tests substitute fakes.

use chrono::Utc;
use openidconnect::url::Url;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use wongnok_platform_access::{
    AuthenticationError, AuthorizeUrlBuilder, CodeExchanger, Credential, KeycloakConfig,
    LogoutQuery, TokenVerifier, VerifiedToken, generate_state,
};

/// Orchestrates the authorization-code flow against the identity provider.
#[derive(Clone)]
pub struct AuthService {
    keycloak: KeycloakConfig,
    authorizer: Arc<dyn AuthorizeUrlBuilder>,
    exchanger: Arc<dyn CodeExchanger>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthService {
    /// Creates a new service.
    ///
    /// `verifier` must check the audience against this application's client ID.
    pub fn new(
        keycloak: KeycloakConfig,
        authorizer: Arc<dyn AuthorizeUrlBuilder>,
        exchanger: Arc<dyn CodeExchanger>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            keycloak,
            authorizer,
            exchanger,
            verifier,
        }
    }

    /// Generates a fresh login state.
    pub fn generate_state(&self) -> String {
        generate_state()
    }

    /// Returns the provider authorization URL for the given state.
    pub fn auth_code_url(&self, state: &str) -> String {
        self.authorizer.auth_code_url(state)
    }

    /// Exchanges an authorization code for a credential.
    ///
    /// The token response must carry a non-empty string `id_token`.
    #[instrument(skip_all)]
    pub async fn exchange(&self, code: &str) -> Result<Credential, AuthenticationError> {
        let token = self.exchanger.exchange(code).await.map_err(|e| {
            AuthenticationError::ExchangeFailed {
                reason: e.to_string(),
            }
        })?;

        let id_token = token
            .extra("id_token")
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string)
            .ok_or(AuthenticationError::MissingIdToken)?;

        debug!(expires_in = ?token.expires_in, "authorization code exchanged");

        Ok(Credential::from_token(token, id_token, Utc::now()))
    }

    /// Verifies an ID token issued to this application.
    #[instrument(skip_all)]
    pub async fn verify_token(
        &self,
        raw_token: &str,
    ) -> Result<VerifiedToken, AuthenticationError> {
        self.verifier
            .verify(raw_token)
            .await
            .map_err(|e| AuthenticationError::VerificationFailed {
                reason: e.to_string(),
            })
    }

    /// Builds the RP-initiated logout URL.
    ///
    /// Existing query parameters of the configured URL are kept; the result is
    /// encoded with keys in sorted order.
    pub fn logout_url(&self, query: &LogoutQuery) -> Result<String, AuthenticationError> {
        let mut url = Url::parse(&self.keycloak.logout_url()).map_err(|e| {
            AuthenticationError::LogoutUrl {
                reason: e.to_string(),
            }
        })?;

        let mut params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        params.insert("id_token_hint".to_string(), query.id_token_hint.clone());
        params.insert(
            "post_logout_redirect_uri".to_string(),
            query.post_logout_redirect_uri.clone(),
        );

        url.query_pairs_mut().clear().extend_pairs(&params);

        Ok(url.to_string())
    }
}
