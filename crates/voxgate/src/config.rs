//! Gateway configuration.
//!
//! A single JSON document holds every tunable. It is created with defaults on first start
//! and read back on every start after that. A handful of environment variables override
//! individual fields so secrets never have to be written to disk.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::DiscoveryCommand;

pub const CONFIG_FILENAME: &str = "gateway.json";
pub const CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// JSON document holding the `[name, path]` pairs.
    pub path: PathBuf,
    pub discovery: DiscoveryCommand,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub generic_targets: GenericTargets,
}

/// Launch targets for the generic "open" buckets used when no inventory entry matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericTargets {
    pub notepad: Option<String>,
    pub calculator: Option<String>,
    pub browser: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
    /// Custom prompt template; the bundled template is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            server: ServerConfig::default(),
            inventory: InventoryConfig::default(),
            resolver: ResolverConfig::default(),
            llm: LlmConfig::default(),
            speech: SpeechConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:12345".to_string(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("applications.json"),
            discovery: DiscoveryCommand::default(),
        }
    }
}

impl Default for GenericTargets {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self {
                notepad: Some("notepad.exe".to_string()),
                calculator: Some("calc.exe".to_string()),
                browser: Some("msedge.exe".to_string()),
            }
        } else {
            Self {
                notepad: None,
                calculator: None,
                browser: None,
            }
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_output_tokens: 50,
            timeout_ms: 5_000,
            prompt_path: None,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            sample_rate: 16_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl GatewayConfig {
    pub fn bind_addr(&self) -> GatewayResult<SocketAddr> {
        self.server.bind.parse().map_err(|error| {
            GatewayError::Config(format!("invalid bind address {}: {error}", self.server.bind))
        })
    }

    /// Apply `VOXGATE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(bind) = get("VOXGATE_BIND") {
            self.server.bind = bind;
        }
        if let Some(key) = get("VOXGATE_LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("VOXGATE_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(model) = get("VOXGATE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = get("VOXGATE_VOSK_MODEL") {
            self.speech.model_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get("VOXGATE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(path));
        }
    }

    /// Anchor every relative path at `base`, normally the directory holding the config file.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.inventory.path = anchor(base, &self.inventory.path);
        if let Some(script) = self.inventory.discovery.script.as_mut() {
            *script = anchor(base, script);
        }
        if let Some(path) = self.llm.prompt_path.as_mut() {
            *path = anchor(base, path);
        }
        if let Some(path) = self.speech.model_path.as_mut() {
            *path = anchor(base, path);
        }
        if let Some(path) = self.logging.file.as_mut() {
            *path = anchor(base, path);
        }
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `$VOXGATE_CONFIG`, else `<data dir>/voxgate/gateway.json`.
pub fn default_config_path() -> PathBuf {
    std::env::var("VOXGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voxgate")
                .join(CONFIG_FILENAME)
        })
}

pub fn load_or_create(path: &Path) -> GatewayResult<GatewayConfig> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| {
            GatewayError::Config(format!(
                "failed to create config directory {}: {error}",
                parent.display()
            ))
        })?;
    }

    if !path.exists() {
        let config = GatewayConfig::default();
        write_config(path, &config)?;
        tracing::info!("wrote default config to {}", path.display());
        return Ok(config);
    }

    let data = std::fs::read_to_string(path).map_err(|error| {
        GatewayError::Config(format!("failed to read config {}: {error}", path.display()))
    })?;
    let config: GatewayConfig = serde_json::from_str(&data).map_err(|error| {
        GatewayError::Config(format!("failed to parse config {}: {error}", path.display()))
    })?;
    if config.version != CONFIG_VERSION {
        tracing::warn!(
            "config {} has version {}, expected {}",
            path.display(),
            config.version,
            CONFIG_VERSION
        );
    }
    Ok(config)
}

/// Load (or create) the config at `path`, apply environment overrides and anchor relative
/// paths at the config directory.
pub fn load(path: &Path) -> GatewayResult<GatewayConfig> {
    let mut config = load_or_create(path)?;
    config.apply_env_overrides();
    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}

pub fn write_config(path: &Path, config: &GatewayConfig) -> GatewayResult<()> {
    let data = serde_json::to_string_pretty(config)
        .map_err(|error| GatewayError::Config(format!("failed to serialize config: {error}")))?;
    std::fs::write(path, data).map_err(|error| {
        GatewayError::Config(format!("failed to write config {}: {error}", path.display()))
    })
}
