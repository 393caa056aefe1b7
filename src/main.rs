use std::sync::Arc;

use trip_api::auth::TokenValidator;
use trip_api::config::AppConfig;
use trip_api::routes::app;
use trip_api::state::AppState;
use trip_api::store::RestStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up JWT_KEY, STORE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Missing signing key or store URL is startup-fatal.
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("configuration error: {}", e);
        std::process::exit(1);
    });

    let store = RestStore::new(&config.store);
    let validator = TokenValidator::new(&config.security);
    let state = AppState::new(Arc::new(store), validator);

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("trip-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
