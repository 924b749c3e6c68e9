//! HTTP router for the wongnok API.

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::user;

/// Builds the application router with every API route under `base_path`.
///
/// Login, callback and logout are public; `/users/me` requires a bearer
/// token. `/health` is served outside the base path.
pub fn router(state: Arc<AppState>, base_path: &str) -> Router {
    let public = Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout));

    let protected = Router::new()
        .route("/users/me", get(user::get_me).put(user::update_me))
        .route_layer(from_fn_with_state(state.clone(), auth::authorize));

    let api = public.merge(protected);

    let app = match normalize_base_path(base_path) {
        Some(base) => Router::new().nest(&base, api),
        None => api,
    };

    app.route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Returns the nest prefix, or `None` when routes belong at the root.
fn normalize_base_path(base_path: &str) -> Option<String> {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}
