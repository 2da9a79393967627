use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::inventory::{ApplicationEntry, ApplicationInventory};
use crate::server::error::ApiError;
use crate::server::ServerState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationView {
    pub index: usize,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationsResponse {
    pub count: usize,
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Deserialize)]
pub struct NewApplicationRequest {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

pub(crate) async fn list_applications(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ApplicationsResponse>, ApiError> {
    Ok(Json(listing(state.inventory())?))
}

pub(crate) async fn add_application(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<NewApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationView>), ApiError> {
    let entry = ApplicationEntry::new(request.name.trim(), request.path.trim());
    let index = state.inventory().add(entry.clone())?;
    tracing::info!("added application {} at index {index}", entry.name);
    Ok((StatusCode::CREATED, Json(view(index, entry))))
}

pub(crate) async fn update_application(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<usize>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationView>, ApiError> {
    let name = request.name.map(|name| name.trim().to_string());
    let path = request.path.map(|path| path.trim().to_string());
    let entry = state.inventory().update(index, name, path)?;
    tracing::info!("updated application {index}: {}", entry.name);
    Ok(Json(view(index, entry)))
}

/// Re-run discovery and replace the inventory with its result.
pub(crate) async fn refresh_applications(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ApplicationsResponse>, ApiError> {
    let entries = state.discovery.run().await?;
    let inventory = state.inventory();
    inventory.replace(entries)?;
    Ok(Json(listing(inventory)?))
}

fn listing(inventory: &ApplicationInventory) -> Result<ApplicationsResponse, ApiError> {
    let applications: Vec<ApplicationView> = inventory
        .list()?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| view(index, entry))
        .collect();
    Ok(ApplicationsResponse {
        count: applications.len(),
        applications,
    })
}

fn view(index: usize, entry: ApplicationEntry) -> ApplicationView {
    ApplicationView {
        index,
        name: entry.name,
        path: entry.path,
    }
}
