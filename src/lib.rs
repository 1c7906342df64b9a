//! Snake screen sessions with a live score and comment feed
//!
//! Each WebSocket connection mounts a screen: a single-player snake game on a
//! toroidal board, ticked by its own loop, plus optional live views of the
//! global comment feed and the player's recent scores. Finished games are
//! appended to the player's score log in the realtime store.

pub mod comments;
pub mod config;
pub mod error;
pub mod event_logger;
pub mod feeds;
pub mod game;
pub mod profile;
pub mod protocol;
pub mod records;
pub mod score_recorder;
pub mod screen;
pub mod session;
pub mod state;
pub mod store;
pub mod ws;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;
use ws::ws_handler;

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Build the router serving screen sessions
pub fn app(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/snake", get(ws_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}
