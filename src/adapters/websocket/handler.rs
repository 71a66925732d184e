//! Websocket endpoint streaming the relay feed to browser clients.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;

use super::relay::RelayFrame;

/// Shared state for the websocket route.
#[derive(Clone)]
pub struct RelayFeed {
    pub feed: broadcast::Sender<RelayFrame>,
}

/// Creates the websocket router.
pub fn ws_routes(state: RelayFeed) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

/// GET /ws: upgrades and streams every relayed record.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelayFeed>) -> Response {
    let rx = state.feed.subscribe();
    ws.on_upgrade(move |socket| stream_feed(socket, rx))
}

async fn stream_feed(mut socket: WebSocket, mut rx: broadcast::Receiver<RelayFrame>) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                let Ok(text) = serde_json::to_string(&frame) else {
                    continue;
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    // Client went away.
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Slow websocket client dropped frames");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
