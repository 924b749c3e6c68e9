use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wongnok_server::{
    app,
    auth::{AppState, AudienceCheck, AuthService, OidcClient, db::PgUserStore},
    config::ServerConfig,
    user::UserService,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // Initialize OIDC client
    tracing::info!(realm = %config.keycloak.realm_url(), "Discovering OIDC provider...");
    let oidc_client = OidcClient::discover(&config.keycloak, config.http.timeout())
        .await
        .expect("failed to discover OIDC provider");

    let oidc = Arc::new(oidc_client.clone());
    let auth_service = AuthService::new(
        config.keycloak.clone(),
        oidc.clone(),
        oidc,
        Arc::new(oidc_client.verifier(AudienceCheck::Required)),
    );
    let user_service = UserService::new(Arc::new(PgUserStore::new(db_pool)));

    // Create application state
    let app_state = Arc::new(AppState::new(
        auth_service,
        user_service,
        Arc::new(oidc_client.verifier(AudienceCheck::Skipped)),
        config.state_cookie,
    ));

    let app = app::router(app_state, &config.api_base_path);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
