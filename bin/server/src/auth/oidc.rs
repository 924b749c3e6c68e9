//! OIDC client implementation using the openidconnect crate.
//!
//! `OidcClient` implements the authorization-URL and code-exchange
//! capabilities; `OidcTokenVerifier` implements token verification, with or
//! without the audience check.

use async_trait::async_trait;
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreIdToken, CoreProviderMetadata, CoreTokenResponse,
    CoreTokenType,
};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointNotSet,
    EndpointSet, IssuerUrl, Nonce, OAuth2TokenResponse, RedirectUrl, Scope,
};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use wongnok_platform_access::{
    AuthorizeUrlBuilder, CodeExchanger, KeycloakConfig, ProviderError, ProviderToken,
    TokenVerifier, VerifiedToken,
};

/// Client built from discovered metadata: authorization endpoint set,
/// token and userinfo endpoints as advertised by the provider.
type DiscoveredClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Whether ID token verification requires `aud` to contain our client ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceCheck {
    /// Tokens issued to this backend (the callback's own ID token).
    Required,
    /// Tokens issued to another client of the realm, such as the SPA.
    Skipped,
}

/// OIDC client for authenticating users against a Keycloak realm.
#[derive(Clone)]
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    scopes: Vec<Scope>,
    http_client: reqwest::Client,
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the realm's provider metadata.
    pub async fn discover(config: &KeycloakConfig, timeout: Duration) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(config.realm_url())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {}", e)))?;

        let http_client = build_http_client(timeout)?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {}", e)))?;

        Self::from_metadata(provider_metadata, config, http_client)
    }

    /// Creates a client from already-known provider metadata.
    pub fn from_metadata(
        provider_metadata: CoreProviderMetadata,
        config: &KeycloakConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, OidcError> {
        let redirect_url = RedirectUrl::new(config.redirect_url().to_string())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URL: {}", e)))?;

        // The library always requests `openid`
        let scopes = config
            .scopes()
            .into_iter()
            .filter(|scope| *scope != "openid")
            .map(|scope| Scope::new(scope.to_string()))
            .collect();

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            redirect_url,
            scopes,
            http_client,
        })
    }

    /// Returns a verifier sharing this client's metadata and keys.
    #[must_use]
    pub fn verifier(&self, audience: AudienceCheck) -> OidcTokenVerifier {
        OidcTokenVerifier {
            client: self.clone(),
            audience,
        }
    }

    fn client(&self) -> DiscoveredClient {
        CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone())
    }
}

impl AuthorizeUrlBuilder for OidcClient {
    fn auth_code_url(&self, state: &str) -> String {
        let client = self.client();
        let state = state.to_string();

        let mut auth_request = client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            move || CsrfToken::new(state),
            Nonce::new_random,
        );

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(scope.clone());
        }

        let (auth_url, _, _) = auth_request.url();
        auth_url.to_string()
    }
}

#[async_trait]
impl CodeExchanger for OidcClient {
    async fn exchange(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        let client = self.client();

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| ProviderError::new(format!("token endpoint error: {}", e)))?;

        let token_response = token_request
            .request_async(&self.http_client)
            .await
            .map_err(|e| ProviderError::new(format!("token exchange failed: {}", e)))?;

        provider_token_from_response(&token_response)
    }
}

/// Verifies ID tokens against the provider's published keys.
#[derive(Clone)]
pub struct OidcTokenVerifier {
    client: OidcClient,
    audience: AudienceCheck,
}

#[async_trait]
impl TokenVerifier for OidcTokenVerifier {
    async fn verify(&self, raw_id_token: &str) -> Result<VerifiedToken, ProviderError> {
        let id_token = CoreIdToken::from_str(raw_id_token)
            .map_err(|e| ProviderError::new(format!("malformed id token: {}", e)))?;

        let client = self.client.client();
        let verifier = client
            .id_token_verifier()
            .require_audience_match(self.audience == AudienceCheck::Required);

        // No nonce is stored server-side; the state cookie binds the attempt.
        let claims = id_token
            .claims(&verifier, |_: Option<&Nonce>| -> Result<(), String> {
                Ok(())
            })
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let payload = serde_json::to_value(claims)
            .map_err(|e| ProviderError::new(format!("failed to serialize claims: {}", e)))?;

        Ok(VerifiedToken::new(payload))
    }
}

/// Flattens a token response into a `ProviderToken`.
///
/// The response is serialized to JSON so that every field outside the core
/// OAuth2 set, `id_token` included, lands in the extension map as raw JSON.
fn provider_token_from_response(
    token_response: &CoreTokenResponse,
) -> Result<ProviderToken, ProviderError> {
    let mut extra = match serde_json::to_value(token_response) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ProviderError::new("token response is not a JSON object")),
        Err(e) => {
            return Err(ProviderError::new(format!(
                "failed to serialize token response: {}",
                e
            )));
        }
    };

    // Bearer keeps the casing providers send; extension types pass through as issued.
    let token_type = match token_response.token_type() {
        CoreTokenType::Bearer => "Bearer".to_string(),
        other => other.as_ref().to_string(),
    };
    for key in ["access_token", "token_type", "refresh_token", "expires_in"] {
        extra.remove(key);
    }

    Ok(ProviderToken {
        access_token: token_response.access_token().secret().clone(),
        token_type,
        refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
        expires_in: token_response.expires_in().map(|d| d.as_secs()),
        extra,
    })
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, OidcError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {}", e)))
}

/// OIDC-related errors.
#[derive(Debug)]
pub enum OidcError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Failed to discover provider metadata.
    Discovery(String),
}

impl std::fmt::Display for OidcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "OIDC configuration error: {}", msg),
            Self::Discovery(msg) => write!(f, "OIDC discovery error: {}", msg),
        }
    }
}

impl std::error::Error for OidcError {}
