use std::path::Path;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{GatewayError, GatewayResult};
use crate::inventory::{load_or_discover, ApplicationInventory};
use crate::llm::build_aid;
use crate::pipeline::Pipeline;
use crate::platform::default_platform;
use crate::prompt::PromptTemplate;
use crate::resolver::Resolver;
use crate::server::ServerState;
use crate::speech::build_speech;
use crate::vocabulary;

const BUNDLED_DISCOVERY_SCRIPT: &str = include_str!("../scripts/DetectApplications.ps1");

/// Assemble the server state from `config`.
///
/// A failed application discovery is not fatal: the gateway starts with an empty inventory
/// that can be filled through the management API.
pub async fn build_state(config: &GatewayConfig) -> GatewayResult<ServerState> {
    if let Some(script) = config.inventory.discovery.script.as_deref() {
        install_discovery_script(script)?;
    }

    let entries = match load_or_discover(&config.inventory.path, &config.inventory.discovery).await
    {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!("starting with an empty application inventory: {error}");
            Vec::new()
        }
    };
    let inventory = ApplicationInventory::persistent(entries, config.inventory.path.clone());

    let aid = build_aid(&config.llm)?;
    let prompt = PromptTemplate::from_config(&config.llm)?;
    let resolver = Resolver::from_config(config, inventory, aid, prompt);
    let dispatcher = Dispatcher::new(default_platform());
    let speech = build_speech(&config.speech);

    let pipeline = Pipeline::new(Arc::new(resolver), dispatcher, speech);

    tracing::info!("available commands: {}", vocabulary::pattern_list());
    tracing::info!(
        "resolver aid={} platform={} speech={} ({} Hz)",
        pipeline.resolver().aid_id(),
        pipeline.dispatcher().platform_id(),
        pipeline.speech().id(),
        pipeline.speech().sample_rate()
    );
    Ok(ServerState::new(pipeline, config.inventory.discovery.clone()))
}

/// Write the bundled discovery script to `path` unless a file is already there.
fn install_discovery_script(path: &Path) -> GatewayResult<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, BUNDLED_DISCOVERY_SCRIPT).map_err(|error| {
        GatewayError::Discovery(format!(
            "failed to write discovery script {}: {error}",
            path.display()
        ))
    })?;
    tracing::info!("installed discovery script at {}", path.display());
    Ok(())
}
