use std::path::Path;
use std::process::{Command, Stdio};

use super::Platform;
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for WindowsPlatform {
    fn id(&self) -> &str {
        "windows"
    }

    fn lock_screen(&self) -> GatewayResult<()> {
        platform_windows::lock_workstation().map_err(GatewayError::Platform)
    }

    fn toggle_media(&self) -> GatewayResult<()> {
        platform_windows::toggle_media_playback().map_err(GatewayError::Platform)
    }

    fn launch(&self, path: &Path) -> GatewayResult<()> {
        Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|error| {
                GatewayError::Platform(format!("failed to launch {}: {error}", path.display()))
            })
    }
}
