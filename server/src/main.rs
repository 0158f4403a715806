#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use notes_server::{
    config::ServerConfig,
    http::{AppState, router},
    service::NotesService,
    storage::{MemoryStore, NoteStore, UserStore},
    time::SystemTimeSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: algorithm={:?}, token_ttl={:?}, listen_port={}",
        config.auth.algorithm(),
        config.auth.default_ttl(),
        config.listen_port
    );

    // One store backs both users and notes.
    let store = Arc::new(MemoryStore::new());
    let shared_store = Arc::clone(&store);
    let users: Arc<dyn UserStore> = shared_store;
    let notes: Arc<dyn NoteStore> = store;
    let service = match NotesService::new(
        config.auth,
        config.password,
        users,
        notes,
        Arc::new(SystemTimeSource),
    ) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to initialize password hashing: {e}");
            std::process::exit(1);
        }
    };

    let app = router(AppState::new(service));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
