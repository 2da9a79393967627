use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;

use crate::server::ServerState;
use crate::session::handle_connection;

pub(crate) async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let pipeline = state.pipeline.clone();
    let connections = state.connections.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, Some(peer), pipeline, connections))
}
