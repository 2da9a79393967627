use std::path::Path;

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::discovery::DiscoveryCommand;
use crate::inventory::store::ApplicationEntry;

/// Read the inventory document. `Ok(None)` when the document does not exist.
pub fn load_entries(path: &Path) -> GatewayResult<Option<Vec<ApplicationEntry>>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(GatewayError::Inventory(format!(
                "failed to read inventory {}: {error}",
                path.display()
            )))
        }
    };
    let entries = serde_json::from_str(&data).map_err(|error| {
        GatewayError::Inventory(format!(
            "failed to parse inventory {}: {error}",
            path.display()
        ))
    })?;
    Ok(Some(entries))
}

pub fn save_entries(path: &Path, entries: &[ApplicationEntry]) -> GatewayResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| {
            GatewayError::Inventory(format!(
                "failed to create inventory directory {}: {error}",
                parent.display()
            ))
        })?;
    }
    let data = serde_json::to_string_pretty(entries)
        .map_err(|error| GatewayError::Inventory(format!("failed to serialize inventory: {error}")))?;
    std::fs::write(path, data).map_err(|error| {
        GatewayError::Inventory(format!(
            "failed to write inventory {}: {error}",
            path.display()
        ))
    })
}

/// Load the inventory document, running discovery and writing the document first when it
/// is absent.
pub async fn load_or_discover(
    path: &Path,
    discovery: &DiscoveryCommand,
) -> GatewayResult<Vec<ApplicationEntry>> {
    if let Some(entries) = load_entries(path)? {
        tracing::info!("loaded {} applications from {}", entries.len(), path.display());
        return Ok(entries);
    }

    tracing::info!("no inventory at {}, detecting applications", path.display());
    let entries = discovery.run().await?;
    save_entries(path, &entries)?;
    tracing::info!("recorded {} applications to {}", entries.len(), path.display());
    Ok(entries)
}
