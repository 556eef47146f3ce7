use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    routing::get,
};
use colored::*;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::registry::{Registry, Subscriber};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub send_timeout: Option<Duration>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "WebSocket server is running." }))
        .route("/health", get(|| async { Json("OK") }))
        .route("/subscribers", get(subscriber_count))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Bind the listener and serve until the process exits. Bind failures are
/// fatal setup errors and propagate to the caller.
pub async fn serve(config: &Config, registry: Arc<Registry>) -> Result<()> {
    let state = AppState {
        registry,
        send_timeout: config.send_timeout(),
    };
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    println!(
        "{} Server running at {}",
        "✓".green(),
        format!("http://{}", addr).bright_blue()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn subscriber_count(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "count": state.registry.len() }))
}

async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(state, socket))
}

/// Connection lifecycle: register the subscriber, forward broadcast bodies
/// to the socket, and watch the inbound direction purely for liveness.
///
/// Two paths can remove the subscriber: the forward task on a write failure
/// and this function on a receive-side close. They may race; removal is
/// idempotent so both are safe.
async fn handle_ws(state: AppState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriber = Subscriber::new(state.registry.next_id(), tx);
    let id = subscriber.id;
    state.registry.add(subscriber);
    tracing::debug!(id, "subscriber connected");

    // Forward broadcast bodies to this client until the channel closes or
    // a write fails.
    let registry = state.registry.clone();
    let send_timeout = state.send_timeout;
    let send_task = tokio::spawn(async move {
        while let Some(body) = rx.recv().await {
            let frame = Message::Text(String::from_utf8_lossy(&body).into_owned().into());
            let delivered = match send_timeout {
                Some(limit) => match tokio::time::timeout(limit, sender.send(frame)).await {
                    Ok(result) => result.is_ok(),
                    Err(_) => {
                        tracing::warn!(id, "write exceeded {limit:?}, dropping subscriber");
                        false
                    }
                },
                None => sender.send(frame).await.is_ok(),
            };
            if !delivered {
                break;
            }
        }
        registry.remove(id);
        let _ = sender.close().await;
    });

    // Inbound frames are only a liveness signal; any error or close frame
    // means the client is gone.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Dropping the registry entry drops the channel sender, which ends the
    // forward task and closes the sink on its way out.
    state.registry.remove(id);
    let _ = send_task.await;
    tracing::debug!(id, "subscriber disconnected");
}
