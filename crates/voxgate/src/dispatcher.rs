use std::path::PathBuf;

use crate::command::Command;
use crate::error::{GatewayError, GatewayResult};
use crate::platform::SharedPlatform;

pub const MISSING_PATH: &str = "ERROR: Application Path not Listed";

/// Executes resolved commands on the host and reports the outcome as text.
#[derive(Clone)]
pub struct Dispatcher {
    platform: SharedPlatform,
}

impl Dispatcher {
    pub fn new(platform: SharedPlatform) -> Self {
        Self { platform }
    }

    pub fn platform_id(&self) -> &str {
        self.platform.id()
    }

    /// Run `command` and describe the result. Every outcome, including failures, is a
    /// status string for the client.
    pub async fn execute(&self, command: &Command) -> String {
        match command {
            Command::Open { name, path } => {
                let Some(path) = path.as_deref().filter(|path| !path.trim().is_empty()) else {
                    return MISSING_PATH.to_string();
                };
                let path = PathBuf::from(path);
                match self.on_host(move |platform| platform.launch(&path)).await {
                    Ok(()) => format!("Opened {name}"),
                    Err(error) => format!("ERROR: Failed to open {name} - {error}"),
                }
            }
            Command::LockScreen => match self.on_host(|platform| platform.lock_screen()).await {
                Ok(()) => "Screen locked".to_string(),
                Err(error) => format!("ERROR: Failed to lock screen - {error}"),
            },
            Command::PlayMedia => match self.on_host(|platform| platform.toggle_media()).await {
                Ok(()) => "Playing active media".to_string(),
                Err(error) => format!("ERROR: Failed to play media - {error}"),
            },
            Command::PauseMedia => match self.on_host(|platform| platform.toggle_media()).await {
                Ok(()) => "Pausing active media".to_string(),
                Err(error) => format!("ERROR: Failed to pause media - {error}"),
            },
            Command::Invalid { reason } => reason.clone(),
            Command::Unrecognized { transcript } => {
                format!("ERROR: NotFound - '{transcript}' is not a recognized command")
            }
        }
    }

    async fn on_host<F>(&self, action: F) -> GatewayResult<()>
    where
        F: FnOnce(&SharedPlatform) -> GatewayResult<()> + Send + 'static,
    {
        let platform = self.platform.clone();
        tokio::task::spawn_blocking(move || action(&platform))
            .await
            .map_err(|error| GatewayError::Internal(format!("host action aborted: {error}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::OPEN_VALIDATION_ERROR;
    use crate::platform::Platform;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingPlatform {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingPlatform {
        fn record(&self, call: String) -> GatewayResult<()> {
            self.calls.lock().expect("calls").push(call);
            if self.fail {
                Err(GatewayError::Platform("denied".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls").clone()
        }
    }

    impl Platform for RecordingPlatform {
        fn id(&self) -> &str {
            "recording"
        }

        fn lock_screen(&self) -> GatewayResult<()> {
            self.record("lock".to_string())
        }

        fn toggle_media(&self) -> GatewayResult<()> {
            self.record("toggle".to_string())
        }

        fn launch(&self, path: &Path) -> GatewayResult<()> {
            self.record(format!("launch {}", path.display()))
        }
    }

    fn setup(fail: bool) -> (Dispatcher, Arc<RecordingPlatform>) {
        let platform = Arc::new(RecordingPlatform {
            fail,
            ..RecordingPlatform::default()
        });
        (Dispatcher::new(platform.clone()), platform)
    }

    #[tokio::test]
    async fn open_launches_the_path() {
        let (dispatcher, platform) = setup(false);
        let status = dispatcher
            .execute(&Command::open("visual studio code", Some("C:\\VSCode.exe".to_string())))
            .await;
        assert_eq!(status, "Opened visual studio code");
        assert_eq!(platform.calls(), vec!["launch C:\\VSCode.exe".to_string()]);
    }

    #[tokio::test]
    async fn open_without_path_is_rejected_before_execution() {
        let (dispatcher, platform) = setup(false);
        assert_eq!(dispatcher.execute(&Command::unresolved_open()).await, MISSING_PATH);
        assert_eq!(
            dispatcher
                .execute(&Command::open("notepad", Some(" ".to_string())))
                .await,
            MISSING_PATH
        );
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn play_and_pause_share_the_toggle() {
        let (dispatcher, platform) = setup(false);
        assert_eq!(dispatcher.execute(&Command::PauseMedia).await, "Pausing active media");
        assert_eq!(dispatcher.execute(&Command::PlayMedia).await, "Playing active media");
        assert_eq!(platform.calls(), vec!["toggle".to_string(), "toggle".to_string()]);
    }

    #[tokio::test]
    async fn lock_screen_reports_success_and_failure() {
        let (dispatcher, _) = setup(false);
        assert_eq!(dispatcher.execute(&Command::LockScreen).await, "Screen locked");
        let (dispatcher, _) = setup(true);
        assert_eq!(
            dispatcher.execute(&Command::LockScreen).await,
            "ERROR: Failed to lock screen - platform error: denied"
        );
    }

    #[tokio::test]
    async fn unrecognized_command_is_not_found() {
        let (dispatcher, platform) = setup(false);
        assert_eq!(
            dispatcher.execute(&Command::unrecognized("asdkjasdkj")).await,
            "ERROR: NotFound - 'asdkjasdkj' is not a recognized command"
        );
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_command_relays_its_reason() {
        let (dispatcher, platform) = setup(false);
        assert_eq!(
            dispatcher.execute(&Command::invalid_open()).await,
            OPEN_VALIDATION_ERROR
        );
        assert!(platform.calls().is_empty());
    }
}
