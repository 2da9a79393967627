use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures_util::FutureExt;

use crate::pipeline::{AudioStream, Pipeline};
use crate::session::manager::ConnectionManager;

/// Reply to a request whose handling panicked. It is sent before the close frame.
pub const INTERNAL_ERROR_REPLY: &str = "ERROR: Internal error while handling request";

/// Message loop for one websocket connection.
///
/// Messages are handled strictly in order: the next one is not read until the reply to the
/// current one has been sent. A panic while handling a message is answered with
/// [`INTERNAL_ERROR_REPLY`], then closes this connection with an error frame and leaves every
/// other connection running.
pub async fn handle_connection(
    mut socket: WebSocket,
    peer: Option<SocketAddr>,
    pipeline: Pipeline,
    connections: ConnectionManager,
) {
    let guard = match connections.register(peer) {
        Ok(guard) => guard,
        Err(error) => {
            tracing::error!("failed to register connection: {error}");
            let _ = socket.send(close_message(close_code::ERROR, "internal error")).await;
            return;
        }
    };
    let id = guard.id().to_string();
    let peer_label = peer
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!("connection {id} opened from {peer_label}");

    let mut audio = AudioStream::default();
    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!("connection {id}: receive failed: {error}");
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => {
                AssertUnwindSafe(pipeline.handle_transcript(&text))
                    .catch_unwind()
                    .await
            }
            Message::Binary(frame) => {
                AssertUnwindSafe(pipeline.handle_audio(&mut audio, &frame))
                    .catch_unwind()
                    .await
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        match reply {
            Ok(status) => {
                guard.record_message();
                if let Err(error) = socket.send(Message::Text(status)).await {
                    tracing::warn!("connection {id}: send failed: {error}");
                    break;
                }
            }
            Err(panic) => {
                tracing::error!(
                    "connection {id}: message handling panicked: {}",
                    panic_message(panic.as_ref())
                );
                let _ = socket.send(Message::Text(INTERNAL_ERROR_REPLY.to_string())).await;
                let _ = socket.send(close_message(close_code::ERROR, "internal error")).await;
                break;
            }
        }
    }

    tracing::info!("connection {id} closed");
}

fn close_message(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
