//! Websocket command channel. One text message in, one text line out.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::controller::{SessionController, SessionError};

pub fn router(controller: Arc<SessionController>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(websocket))
        .with_state(controller)
}

/// Serve until a client sends `exit`.
pub async fn serve(
    listener: TcpListener,
    controller: Arc<SessionController>,
) -> std::io::Result<()> {
    let shutdown = controller.shutdown_signal().clone();
    if let Ok(addr) = listener.local_addr() {
        log::info!("Command channel listening on ws://{}/ws", addr);
    }
    axum::serve(listener, router(controller))
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;
    log::info!("Command channel stopped");
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn websocket(
    ws: WebSocketUpgrade,
    State(controller): State<Arc<SessionController>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, controller))
}

async fn handle_socket(mut socket: WebSocket, controller: Arc<SessionController>) {
    let shutdown = controller.shutdown_signal().clone();
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            message = socket.recv() => {
                let Some(message) = message else {
                    break;
                };
                match message {
                    Ok(Message::Text(text)) => {
                        let text = text.as_str().to_string();
                        let reply = match run_command(controller.clone(), text).await {
                            Ok(reply) => reply,
                            Err(e) => {
                                log::warn!("{}", e);
                                break;
                            }
                        };
                        if socket.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                        if shutdown.is_triggered() {
                            break;
                        }
                    }
                    Ok(Message::Ping(payload)) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => break,
                    Err(_) => break,
                }
            }
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

/// Commands block on the scene lock and on file I/O, so they run off the
/// async workers.
async fn run_command(
    controller: Arc<SessionController>,
    text: String,
) -> Result<String, SessionError> {
    tokio::task::spawn_blocking(move || controller.handle(&text))
        .await
        .map_err(|_| SessionError::ChannelClosed)
}
