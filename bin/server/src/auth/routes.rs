//! Authentication routes for login, callback, and logout.
//!
//! The login state travels in a short-lived cookie; nothing is stored
//! server-side between the redirect and the callback.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tracing::{info, warn};
use wongnok_platform_access::{
    AuthenticationError, CallbackQuery, CredentialResponse, LogoutQuery,
};

use super::AppState;
use crate::config::StateCookieConfig;
use crate::error::ApiError;

/// Login state cookie name.
pub const STATE_COOKIE: &str = "state";

/// Starts the login flow by redirecting to the identity provider.
pub async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let login_state = state.auth_service.generate_state();
    let auth_url = state.auth_service.auth_code_url(&login_state);

    let cookie = state_cookie(
        &state.state_cookie,
        login_state,
        TimeDuration::seconds(state.state_cookie.max_age_seconds),
    );

    (jar.add(cookie), Redirect::temporary(&auth_url))
}

/// Completes the login flow after the identity provider redirects back.
///
/// The state cookie is cleared in every response.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    let result = complete_login(&state, query, expected_state.as_deref())
        .await
        .map(Json);

    let jar = jar.add(state_cookie(
        &state.state_cookie,
        String::new(),
        TimeDuration::ZERO,
    ));

    (jar, result)
}

/// Redirects to the identity provider's logout endpoint.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogoutQuery>,
) -> Result<Redirect, ApiError> {
    let logout_url = state.auth_service.logout_url(&query)?;
    Ok(Redirect::temporary(&logout_url))
}

/// Runs the callback pipeline: state check, exchange, verify, decode, upsert.
///
/// Each stage runs only if every earlier stage succeeded.
async fn complete_login(
    state: &AppState,
    query: CallbackQuery,
    expected_state: Option<&str>,
) -> Result<CredentialResponse, ApiError> {
    match expected_state {
        Some(expected) if !expected.is_empty() && expected == query.state => {}
        _ => {
            warn!(
                cookie_present = expected_state.is_some(),
                "rejecting callback with invalid state"
            );
            return Err(AuthenticationError::InvalidState.into());
        }
    }

    let credential = state.auth_service.exchange(&query.code).await?;
    let verified = state.auth_service.verify_token(credential.id_token()).await?;
    let claims = verified.decode_claims()?;
    let user = state.user_service.upsert_with_claims(&claims).await?;

    info!(user_id = %user.id(), "user logged in");

    Ok(credential.to_response())
}

fn state_cookie(
    config: &StateCookieConfig,
    value: String,
    max_age: TimeDuration,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((STATE_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .max_age(max_age);

    if let Some(domain) = &config.domain {
        cookie = cookie.domain(domain.clone());
    }

    cookie.build()
}

#[cfg(test)]
mod tests {
    use crate::app::router;
    use crate::config::StateCookieConfig;
    use crate::test_support::{
        FakeProvider, FakeUserStore, app_state, app_state_with_cookie, body_json,
        verified_claims,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;
    use wongnok_platform_access::ProviderToken;

    fn happy_provider() -> FakeProvider {
        FakeProvider::with_token(ProviderToken::new("T").with_extra("id_token", json!("I")))
            .and_verified(verified_claims("u1", "A", "B"))
    }

    fn callback_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn set_cookie_headers(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn login_sets_state_cookie_and_redirects() {
        let provider = Arc::new(FakeProvider::default());
        let state = app_state(
            provider,
            Arc::new(FakeProvider::default()),
            Arc::new(FakeUserStore::default()),
        );
        let app = router(state, "/api/v1");

        let response = app
            .oneshot(callback_request("/api/v1/login", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        let cookie = &cookies[0];
        assert!(cookie.starts_with("state="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=300"));
        assert!(!cookie.contains("Secure"));

        let value = cookie
            .trim_start_matches("state=")
            .split(';')
            .next()
            .unwrap();
        assert_eq!(value.len(), 43);

        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, format!("http://example.com/auth?state={value}"));
    }

    #[tokio::test]
    async fn login_cookie_follows_configured_attributes() {
        let cookie_config = StateCookieConfig {
            secure: true,
            domain: Some("wongnok.example.com".to_string()),
            max_age_seconds: 120,
        };
        let state = app_state_with_cookie(
            Arc::new(FakeProvider::default()),
            Arc::new(FakeProvider::default()),
            Arc::new(FakeUserStore::default()),
            cookie_config,
        );
        let app = router(state, "/api/v1");

        let response = app
            .oneshot(callback_request("/api/v1/login", None))
            .await
            .unwrap();

        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        let cookie = &cookies[0];
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Domain=wongnok.example.com"));
        assert!(cookie.contains("Max-Age=120"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn callback_removal_cookie_keeps_configured_domain() {
        let cookie_config = StateCookieConfig {
            secure: true,
            domain: Some("wongnok.example.com".to_string()),
            max_age_seconds: 300,
        };
        let state = app_state_with_cookie(
            Arc::new(happy_provider()),
            Arc::new(FakeProvider::default()),
            Arc::new(FakeUserStore::default()),
            cookie_config,
        );
        let app = router(state, "/api/v1");

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookie_headers(&response);
        assert!(cookies.iter().any(|c| c.starts_with("state=")
            && c.contains("Max-Age=0")
            && c.contains("Domain=wongnok.example.com")
            && c.contains("Secure")));
    }

    #[tokio::test]
    async fn callback_rejects_mismatched_state_without_exchange() {
        let provider = Arc::new(happy_provider());
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider.clone(), Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=evil&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "message": "Invalid state" }));
        assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn callback_rejects_missing_cookie_without_exchange() {
        let provider = Arc::new(happy_provider());
        let app = router(
            app_state(
                provider.clone(),
                Arc::new(FakeProvider::default()),
                Arc::new(FakeUserStore::default()),
            ),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request("/api/v1/callback?state=abc&code=xyz", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "message": "Invalid state" }));
        assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn callback_rejects_empty_state_pair() {
        let provider = Arc::new(happy_provider());
        let app = router(
            app_state(
                provider.clone(),
                Arc::new(FakeProvider::default()),
                Arc::new(FakeUserStore::default()),
            ),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request("/api/v1/callback?code=xyz", Some("state=")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn callback_happy_path_returns_credential_and_upserts_once() {
        let provider = Arc::new(happy_provider());
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider.clone(), Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookie_headers(&response);
        assert!(cookies.iter().any(|c| c.starts_with("state=") && c.contains("Max-Age=0")));

        let body = body_json(response).await;
        assert_eq!(body["accessToken"], "T");
        assert_eq!(body["idToken"], "I");

        assert_eq!(provider.exchanged_codes(), vec!["xyz".to_string()]);
        assert_eq!(provider.verified_tokens(), vec!["I".to_string()]);

        let upserts = store.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].id().as_str(), "u1");
        assert_eq!(upserts[0].first_name(), "A");
        assert_eq!(upserts[0].last_name(), "B");
    }

    #[tokio::test]
    async fn callback_exchange_failure_returns_500() {
        let provider = Arc::new(FakeProvider::failing_exchange("invalid_grant"));
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider.clone(), Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "exchange token: invalid_grant" })
        );
        assert_eq!(provider.verify_calls.load(Ordering::SeqCst), 0);
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn callback_missing_id_token_skips_verification() {
        let provider = Arc::new(
            FakeProvider::with_token(ProviderToken::new("T"))
                .and_verified(verified_claims("u1", "A", "B")),
        );
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider.clone(), Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "id token is missing" })
        );
        assert_eq!(provider.verify_calls.load(Ordering::SeqCst), 0);
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn callback_verify_failure_never_upserts() {
        let provider = Arc::new(
            FakeProvider::with_token(ProviderToken::new("T").with_extra("id_token", json!("I")))
                .and_failing_verify("token is expired"),
        );
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider.clone(), Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "verify token: token is expired" })
        );
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn callback_claims_decode_failure_never_upserts() {
        let provider = Arc::new(
            FakeProvider::with_token(ProviderToken::new("T").with_extra("id_token", json!("I")))
                .and_verified(wongnok_platform_access::VerifiedToken::new(json!({ "sub": "u1" }))),
        );
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider, Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("decode claims: "));
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn callback_upsert_failure_returns_500() {
        let app = router(
            app_state(
                Arc::new(happy_provider()),
                Arc::new(FakeProvider::default()),
                Arc::new(FakeUserStore::failing_upsert("connection reset")),
            ),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "upsert user: connection reset" })
        );
    }

    #[tokio::test]
    async fn callback_incomplete_claims_fail_before_write() {
        let provider = Arc::new(
            FakeProvider::with_token(ProviderToken::new("T").with_extra("id_token", json!("I")))
                .and_verified(verified_claims("u1", "A", "")),
        );
        let store = Arc::new(FakeUserStore::default());
        let app = router(
            app_state(provider, Arc::new(FakeProvider::default()), store.clone()),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/callback?state=abc&code=xyz",
                Some("state=abc"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("claims invalid: "));
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn logout_redirects_to_provider() {
        let app = router(
            app_state(
                Arc::new(FakeProvider::default()),
                Arc::new(FakeProvider::default()),
                Arc::new(FakeUserStore::default()),
            ),
            "/api/v1",
        );

        let response = app
            .oneshot(callback_request(
                "/api/v1/logout?idTokenHint=t&postLogoutRedirectUri=r",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "http://example.com/realms/demo/protocol/openid-connect/logout?id_token_hint=t&post_logout_redirect_uri=r"
        );
    }
}
