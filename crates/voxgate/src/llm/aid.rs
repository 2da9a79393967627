use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{GatewayError, GatewayResult};

/// Bounds on a single completion. Kept small so replies stay short and repeatable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 50,
            temperature: 0.1,
        }
    }
}

impl From<&LlmConfig> for GenerationParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
pub trait GenerativeAid: Send + Sync {
    fn id(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    /// Free text completion of `prompt`. An empty reply is returned as-is; callers decide
    /// whether it means anything.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> GatewayResult<String>;
}

pub type SharedGenerativeAid = Arc<dyn GenerativeAid>;

/// Stand-in used when no model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAid;

#[async_trait]
impl GenerativeAid for UnavailableAid {
    fn id(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> GatewayResult<String> {
        Err(GatewayError::GenerativeAid(
            "no generative aid is configured".to_string(),
        ))
    }
}
