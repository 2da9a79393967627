use std::path::Path;

use crate::config::LlmConfig;
use crate::error::{GatewayError, GatewayResult};

pub const APP_LIST_PLACEHOLDER: &str = "{app_list}";
pub const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

const BUNDLED_TEMPLATE: &str = include_str!("../assets/prompt.txt");

/// Prompt sent to the generative aid, with slots for the known application names and the
/// raw transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: BUNDLED_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn load(path: &Path) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            GatewayError::Config(format!(
                "failed to read prompt template {}: {error}",
                path.display()
            ))
        })?;
        if !text.contains(USER_INPUT_PLACEHOLDER) {
            tracing::warn!(
                "prompt template {} has no {USER_INPUT_PLACEHOLDER} placeholder",
                path.display()
            );
        }
        Ok(Self { text })
    }

    /// The configured template, or the bundled one when none is set.
    pub fn from_config(config: &LlmConfig) -> GatewayResult<Self> {
        match config.prompt_path.as_deref() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `app_list` is the `|`-joined application names, see [`InventorySnapshot::joined_names`].
    ///
    /// [`InventorySnapshot::joined_names`]: crate::inventory::InventorySnapshot::joined_names
    pub fn render(&self, app_list: &str, transcript: &str) -> String {
        self.text
            .replace(APP_LIST_PLACEHOLDER, app_list)
            .replace(USER_INPUT_PLACEHOLDER, transcript)
    }
}
