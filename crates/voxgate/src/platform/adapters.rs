use std::path::Path;
use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};

/// Host automation primitives. Calls block, so async callers run them on the blocking pool.
pub trait Platform: Send + Sync {
    fn id(&self) -> &str {
        "unsupported"
    }

    fn lock_screen(&self) -> GatewayResult<()> {
        Err(GatewayError::NotImplemented)
    }

    /// The host exposes a single play/pause toggle, not separate play and pause actions.
    fn toggle_media(&self) -> GatewayResult<()> {
        Err(GatewayError::NotImplemented)
    }

    /// Start the executable at `path` without waiting for it.
    fn launch(&self, _path: &Path) -> GatewayResult<()> {
        Err(GatewayError::NotImplemented)
    }
}

pub type SharedPlatform = Arc<dyn Platform>;

#[cfg(target_os = "windows")]
pub mod windows;
#[cfg(any(not(target_os = "windows"), test))]
pub mod portable;
