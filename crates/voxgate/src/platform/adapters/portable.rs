use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use super::Platform;
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Default)]
pub struct PortablePlatform;

impl PortablePlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for PortablePlatform {
    fn id(&self) -> &str {
        "portable"
    }

    fn lock_screen(&self) -> GatewayResult<()> {
        lock_screen_native()
    }

    fn toggle_media(&self) -> GatewayResult<()> {
        toggle_media_native()
    }

    fn launch(&self, path: &Path) -> GatewayResult<()> {
        launch_native(path)
    }
}

fn ensure_command_success(status: ExitStatus, command_label: &str) -> GatewayResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(GatewayError::Platform(format!(
            "{command_label} failed with status {status}"
        )))
    }
}

fn run(program: &str, args: &[&str]) -> GatewayResult<()> {
    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|error| GatewayError::Platform(format!("failed to run {program}: {error}")))?;
    ensure_command_success(status, program)
}

#[cfg(target_os = "linux")]
fn lock_screen_native() -> GatewayResult<()> {
    run("loginctl", &["lock-session"])
}

#[cfg(target_os = "macos")]
fn lock_screen_native() -> GatewayResult<()> {
    run("pmset", &["displaysleepnow"])
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn lock_screen_native() -> GatewayResult<()> {
    Err(GatewayError::Platform(
        "lock screen is not supported on this platform".to_string(),
    ))
}

#[cfg(target_os = "linux")]
fn toggle_media_native() -> GatewayResult<()> {
    run("playerctl", &["play-pause"])
}

#[cfg(not(target_os = "linux"))]
fn toggle_media_native() -> GatewayResult<()> {
    Err(GatewayError::Platform(
        "media toggle is not supported on this platform".to_string(),
    ))
}

#[cfg(target_os = "macos")]
fn launch_native(path: &Path) -> GatewayResult<()> {
    run("open", &[&path.to_string_lossy()])
}

#[cfg(not(target_os = "macos"))]
fn launch_native(path: &Path) -> GatewayResult<()> {
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
