use interesthings::config::Config;
use interesthings::db::{MemStore, PgStore};
use interesthings::{build_app, AppState};
use std::panic;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "interesthings=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Pick the data store
    let state = match &config.db_url {
        Some(db_url) => {
            let store = match PgStore::connect(db_url, config.db_max_connections).await {
                Ok(store) => store,
                Err(e) => {
                    error!("Failed to initialize database: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = store.ensure_schema().await {
                error!("Failed to prepare database schema: {}", e);
                std::process::exit(1);
            }
            info!("Database initialized successfully");
            AppState::new(Arc::new(store), config.clone())
        }
        None => {
            warn!("No database URL configured - data is kept in memory and lost on restart");
            AppState::new(Arc::new(MemStore::new()), config.clone())
        }
    };

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 Dashboard feed available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
