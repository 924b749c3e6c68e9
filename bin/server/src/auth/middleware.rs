//! Bearer token middleware and claims extractors for Axum.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Extensions, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use wongnok_platform_access::{AuthorizationError, Claims};

use super::AppState;
use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Requires a valid bearer ID token on the request.
///
/// On success the decoded [`Claims`] are stored in the request extensions
/// and the request continues. Every failure is a 401 and the downstream
/// handler is not run.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthorizationError::Unauthorized)?;

    let verified = state.bearer_verifier.verify(raw_token).await.map_err(|e| {
        debug!(error = %e, "rejecting bearer token");
        ApiError::unauthorized(e.to_string())
    })?;

    let claims = verified.decode_claims().map_err(|e| {
        debug!(error = %e, "bearer token claims do not decode");
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Returns the claims stored by [`authorize`].
///
/// # Errors
///
/// Returns `Unauthorized` if the request did not pass through the middleware.
pub fn decode_claims(extensions: &Extensions) -> Result<Claims, AuthorizationError> {
    extensions
        .get::<Claims>()
        .cloned()
        .ok_or(AuthorizationError::Unauthorized)
}

/// Extractor for the authenticated caller's claims.
///
/// Only valid on routes behind [`authorize`].
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthClaims(decode_claims(&parts.extensions)?))
    }
}
