//! `WebSocket` handler for observer connections.
//!
//! On connect the observer is registered with the [`BroadcastHub`] while
//! the world lock is held, so its first frame is the current snapshot and no
//! tick can slip in ahead of it. The socket is then split:
//!
//! - a delivery task drains the connection's queue into the sink
//! - the receive loop feeds inbound text frames to a [`CommandProcessor`]
//!
//! Either side ending (client close, receive error, failed send, eviction)
//! ends the connection and removes it from the hub. Nothing here touches the
//! scheduler or other connections.
//!
//! [`BroadcastHub`]: crate::hub::BroadcastHub

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use geopolitics_core::command::CommandProcessor;
use tracing::{debug, warn};

use crate::hub::Subscription;
use crate::state::AppState;

/// Upgrade an HTTP request to an observer connection.
///
/// # Route
///
/// `GET /ws` (also `GET /api/ws`)
pub async fn ws_observer(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let hub = Arc::clone(&state.hub);
    let registration = state
        .sim
        .with_world(|world| hub.register(&world.snapshot()))
        .await;
    let Subscription { id, mut frames } = match registration {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Failed to register observer");
            return;
        }
    };
    debug!(connection = %id, "Observer connected");

    let (mut sink, mut stream) = socket.split();

    let mut delivery = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }
        // Queue closed: evicted by the hub.
        let _ = sink.close().await;
    });

    let processor = CommandProcessor::new(Arc::clone(&state.sim));

    loop {
        tokio::select! {
            _ = &mut delivery => {
                debug!(connection = %id, "Delivery ended");
                break;
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        processor.handle_frame(text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection = %id, "Observer disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(connection = %id, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Pings are answered by the protocol layer; binary is not a command.
                    }
                }
            }
        }
    }

    state.hub.unregister(id);
    delivery.abort();
}
