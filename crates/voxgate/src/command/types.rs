use serde::{Deserialize, Serialize};

use crate::vocabulary::{entry_for, Intent, APPLICATION_PLACEHOLDER};

/// Command string carried by an "open" request that named no known application.
pub const OPEN_VALIDATION_ERROR: &str = "ERROR validating open command";

/// A resolved request, decoded once by the resolver and matched exhaustively by the
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch an application. `path` is `None` when nothing could be resolved; the
    /// dispatcher refuses to execute such a command.
    Open { name: String, path: Option<String> },
    LockScreen,
    PlayMedia,
    PauseMedia,
    /// Resolution failed in a way the client must hear about.
    Invalid { reason: String },
    /// The transcript matched nothing and is carried through unchanged.
    Unrecognized { transcript: String },
}

/// Flat `{command, path}` view of a [`Command`], as logged and returned by the
/// resolve preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Command {
    pub fn open(name: impl Into<String>, path: Option<String>) -> Self {
        Command::Open {
            name: name.into(),
            path,
        }
    }

    /// The generic `open <application_name>` placeholder.
    pub fn unresolved_open() -> Self {
        Command::Open {
            name: APPLICATION_PLACEHOLDER.to_string(),
            path: None,
        }
    }

    pub fn invalid_open() -> Self {
        Command::Invalid {
            reason: OPEN_VALIDATION_ERROR.to_string(),
        }
    }

    pub fn unrecognized(transcript: impl Into<String>) -> Self {
        Command::Unrecognized {
            transcript: transcript.into(),
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        match self {
            Command::Open { .. } => Some(Intent::Open),
            Command::LockScreen => Some(Intent::LockScreen),
            Command::PlayMedia => Some(Intent::PlayMedia),
            Command::PauseMedia => Some(Intent::PauseMedia),
            Command::Invalid { .. } | Command::Unrecognized { .. } => None,
        }
    }

    /// Whether the command can be handed to the host as-is.
    pub fn is_executable(&self) -> bool {
        match self {
            Command::Open { path, .. } => path.as_deref().is_some_and(|p| !p.trim().is_empty()),
            Command::LockScreen | Command::PlayMedia | Command::PauseMedia => true,
            Command::Invalid { .. } | Command::Unrecognized { .. } => false,
        }
    }

    pub fn descriptor(&self) -> CommandDescriptor {
        match self {
            Command::Open { name, path } => CommandDescriptor {
                command: format!("open {name}"),
                path: path.clone(),
            },
            Command::LockScreen | Command::PlayMedia | Command::PauseMedia => {
                let pattern = self
                    .intent()
                    .map(|intent| entry_for(intent).pattern)
                    .unwrap_or_default();
                CommandDescriptor {
                    command: pattern.to_string(),
                    path: None,
                }
            }
            Command::Invalid { reason } => CommandDescriptor {
                command: reason.clone(),
                path: None,
            },
            Command::Unrecognized { transcript } => CommandDescriptor {
                command: transcript.clone(),
                path: None,
            },
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let descriptor = self.descriptor();
        match descriptor.path {
            Some(path) => write!(f, "{} ({path})", descriptor.command),
            None => write!(f, "{}", descriptor.command),
        }
    }
}
