use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shinobi::{create_router, AppState, CharacterStore, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shinobi=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: PORT (overrides the listen port)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting shinobi server");
    tracing::info!("Listen address: {}", config.listen_addr);

    // Seed the in-memory catalog
    let store = CharacterStore::seeded();
    let seeded = store.count().unwrap_or(0);
    tracing::info!("Seeded catalog with {} characters", seeded);

    // Create app state and build the router
    let state = AppState::new(store);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server running at http://{}", config.listen_addr);

    axum::serve(listener, app).await.expect("Server error");
}
