//! Optional generative aid used to bias command resolution.
//!
//! The resolver only sees [`GenerativeAid`]. Without a configured model it gets the
//! [`UnavailableAid`] and resolves every transcript through the keyword rules.

pub mod aid;
pub mod openai;

use std::sync::Arc;

pub use aid::{GenerationParams, GenerativeAid, SharedGenerativeAid, UnavailableAid};
pub use openai::OpenAiCompatibleAid;

use crate::config::LlmConfig;
use crate::error::GatewayResult;

/// The real adapter when the model is enabled and reachable by key or base URL, the null
/// adapter otherwise.
pub fn build_aid(config: &LlmConfig) -> GatewayResult<SharedGenerativeAid> {
    if !config.enabled {
        tracing::info!("generative aid disabled");
        return Ok(Arc::new(UnavailableAid));
    }
    if config.api_key.is_none() && config.base_url.is_none() {
        tracing::warn!("generative aid enabled but no api key or base url is configured");
        return Ok(Arc::new(UnavailableAid));
    }
    let aid = OpenAiCompatibleAid::from_config(config)?;
    tracing::info!("generative aid {} using model {}", aid.id(), config.model);
    Ok(Arc::new(aid))
}
