use std::fs::{create_dir_all, File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber once. `RUST_LOG` wins over the configured level; when a
/// log file is configured, events are appended to it instead of written to stderr.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.get_or_init(|| {
        let level = fallback_level(&config.level);
        let make_filter = || {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(level))
                .unwrap_or_else(|_| EnvFilter::new("info"))
        };

        match config.file.as_deref().and_then(open_log_file) {
            Some(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            None => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .try_init();
            }
        }
    });
}

fn fallback_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(error) = create_dir_all(parent) {
            eprintln!(
                "failed to create log directory '{}': {error}",
                parent.display()
            );
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(error) => {
            eprintln!("failed to open log file '{}': {error}", path.display());
            None
        }
    }
}
