use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::command::CommandDescriptor;
use crate::server::error::ApiError;
use crate::server::ServerState;
use crate::session::ConnectionInfo;
use crate::vocabulary::{self, Intent, VocabularyEntry};

#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    pub patterns: String,
    pub entries: Vec<VocabularyEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub count: usize,
    pub connections: Vec<ConnectionInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub transcript: String,
}

/// Resolution preview. Nothing is executed.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    #[serde(flatten)]
    pub descriptor: CommandDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub executable: bool,
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

pub(crate) async fn vocabulary() -> Json<VocabularyResponse> {
    Json(VocabularyResponse {
        patterns: vocabulary::pattern_list(),
        entries: vocabulary::entries().to_vec(),
    })
}

pub(crate) async fn connections(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let connections = state.connections.list()?;
    Ok(Json(ConnectionsResponse {
        count: connections.len(),
        connections,
    }))
}

pub(crate) async fn resolve(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    let command = state.pipeline.resolver().resolve(&request.transcript).await;
    Json(ResolveResponse {
        descriptor: command.descriptor(),
        intent: command.intent(),
        executable: command.is_executable(),
    })
}
