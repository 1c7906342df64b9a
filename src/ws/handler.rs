//! WebSocket handler - one connection is one mounted screen

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::screen::ScreenSession;
use crate::state::AppState;

/// How long queued messages may take to flush after the screen closes
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Session token from the identity provider; missing means anonymous
    #[serde(default)]
    pub token: String,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.token))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: String) {
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let mut screen = ScreenSession::mount(state.clone(), &token, outbox).await;
    let screen_id = screen.id();

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Task to send queued messages to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbox_rx.recv().await {
            let closing = matches!(msg, ServerMessage::SignedOut);
            if sender.send(Message::Text(msg.to_json().into())).await.is_err() {
                break;
            }
            if closing {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });
    let mut send_done = false;

    loop {
        tokio::select! {
            _ = &mut send_task => {
                send_done = true;
                break;
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ClientMessage::parse(text.as_str()) {
                    Some(msg) => {
                        if screen.handle(msg).await.is_break() {
                            break;
                        }
                    }
                    None => debug!("Screen {} sent unknown message: {}", screen_id, text.as_str()),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Screen {} closed by client", screen_id);
                    break;
                }
                Some(Ok(_)) => {
                    // Ignore binary, ping, pong frames
                }
                Some(Err(e)) => {
                    error!("WebSocket error for screen {}: {}", screen_id, e);
                    break;
                }
            }
        }
    }

    // Clean up: stop the game loop and every subscription
    screen.unmount().await;

    if !send_done && tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        warn!("Screen {} did not flush in time", screen_id);
        send_task.abort();
    }

    info!("Screen {} disconnected ({} screens mounted)", screen_id, state.session_count());
}
