//! Snake feed WebSocket server
//!
//! Serves single-player snake screen sessions backed by in-memory stores.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snake_feed::config::{SERVER_PORT, TICK_DELAY_MS};
use snake_feed::event_logger::EventLogger;
use snake_feed::state::AppState;
use snake_feed::store::{InMemoryBlobStore, InMemoryIdentity, InMemoryStore, UserProfile};

/// Token of the demo account signed in at startup
const DEMO_TOKEN: &str = "demo";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_feed=debug,tower_http=debug".into()),
        )
        .init();

    let identity = InMemoryIdentity::new();
    identity.sign_in(
        DEMO_TOKEN,
        UserProfile {
            uid: "demo-user".to_string(),
            display_name: "Demo".to_string(),
            avatar_url: None,
            email: Some("demo@example.com".to_string()),
        },
    );

    // Create shared state
    let state = Arc::new(AppState::with_services(
        Arc::new(InMemoryStore::new()),
        Arc::new(identity),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(EventLogger::new()),
    ));

    let app = snake_feed::app(state);

    // Start the server
    let addr = format!("0.0.0.0:{}", SERVER_PORT);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };

    info!("🐍 Snake server running on http://{}", addr);
    info!("   WebSocket endpoint: ws://localhost:{}/ws/snake?token={}", SERVER_PORT, DEMO_TOKEN);
    info!("   Each screen ticks every {}ms", TICK_DELAY_MS);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
