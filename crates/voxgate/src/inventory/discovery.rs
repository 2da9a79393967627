use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::store::ApplicationEntry;

const NAME_FIELD: &str = "DisplayName";
const PATH_FIELD: &str = "Executable";

/// External program that lists installed applications on stdout.
///
/// The output is a sequence of records separated by blank lines, one
/// `Property : Value` pair per line:
///
/// ```text
/// DisplayName : Visual Studio Code
/// Executable  : "C:\Program Files\Microsoft VS Code\Code.exe"
///
/// DisplayName : Spotify
/// Executable  : C:\Users\me\AppData\Roaming\Spotify\Spotify.exe
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Script passed as the final argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
}

impl Default for DiscoveryCommand {
    fn default() -> Self {
        Self {
            program: "powershell.exe".to_string(),
            args: vec![
                "-NoProfile".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
            ],
            script: Some(PathBuf::from("scripts/DetectApplications.ps1")),
        }
    }
}

impl DiscoveryCommand {
    pub async fn run(&self) -> GatewayResult<Vec<ApplicationEntry>> {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(script) = &self.script {
            command.arg(script);
        }
        let output = command.output().await.map_err(|error| {
            GatewayError::Discovery(format!("failed to run {}: {error}", self.program))
        })?;
        if !output.status.success() {
            return Err(GatewayError::Discovery(format!(
                "{} failed with status {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries = parse_discovery_output(&stdout);
        if entries.is_empty() {
            tracing::warn!("application discovery returned no applications");
        } else {
            tracing::info!("detected {} applications", entries.len());
        }
        Ok(entries)
    }
}

/// Parse discovery output into entries. Records missing either field are dropped and
/// quotes around the executable path are removed.
pub fn parse_discovery_output(output: &str) -> Vec<ApplicationEntry> {
    let mut entries = Vec::new();
    let mut record: HashMap<String, String> = HashMap::new();

    for line in output.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            finish_record(&mut record, &mut entries);
            continue;
        }
        if let Some((property, value)) = line.split_once(" : ") {
            record.insert(property.trim().to_string(), value.trim().to_string());
        }
    }
    finish_record(&mut record, &mut entries);

    entries
}

fn finish_record(record: &mut HashMap<String, String>, entries: &mut Vec<ApplicationEntry>) {
    if let (Some(name), Some(path)) = (record.get(NAME_FIELD), record.get(PATH_FIELD)) {
        let path = path.trim_matches('"');
        entries.push(ApplicationEntry::new(name.clone(), path));
    }
    record.clear();
}
