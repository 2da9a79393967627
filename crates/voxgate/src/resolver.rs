//! Transcript to [`Command`] resolution.
//!
//! The keyword rules always run first. A definitive rule result (a fixed intent, or an open
//! request with a launch path) is returned as-is, so those transcripts resolve identically
//! with or without a generative aid. Only transcripts the rules leave unresolved are offered
//! to the aid, under a timeout, and any aid failure falls back to the rule result.

use std::sync::Arc;
use std::time::Duration;

use crate::command::keywords::{self, open_remainder, Bucket, GenericApp};
use crate::command::Command;
use crate::config::{GatewayConfig, GenericTargets};
use crate::inventory::{ApplicationInventory, InventorySnapshot};
use crate::llm::{GenerationParams, SharedGenerativeAid, UnavailableAid};
use crate::prompt::PromptTemplate;
use crate::vocabulary::{self, Intent};

pub const DEFAULT_AID_TIMEOUT: Duration = Duration::from_millis(5_000);

pub struct Resolver {
    inventory: ApplicationInventory,
    aid: SharedGenerativeAid,
    prompt: PromptTemplate,
    params: GenerationParams,
    timeout: Duration,
    generic_targets: GenericTargets,
}

impl Resolver {
    /// Resolver over `inventory` with no generative aid.
    pub fn new(inventory: ApplicationInventory) -> Self {
        Self {
            inventory,
            aid: Arc::new(UnavailableAid),
            prompt: PromptTemplate::default(),
            params: GenerationParams::default(),
            timeout: DEFAULT_AID_TIMEOUT,
            generic_targets: GenericTargets::default(),
        }
    }

    pub fn from_config(
        config: &GatewayConfig,
        inventory: ApplicationInventory,
        aid: SharedGenerativeAid,
        prompt: PromptTemplate,
    ) -> Self {
        Self::new(inventory)
            .with_aid(aid)
            .with_prompt(prompt)
            .with_params(GenerationParams::from(&config.llm))
            .with_timeout(Duration::from_millis(config.llm.timeout_ms))
            .with_generic_targets(config.resolver.generic_targets.clone())
    }

    pub fn with_aid(mut self, aid: SharedGenerativeAid) -> Self {
        self.aid = aid;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_generic_targets(mut self, targets: GenericTargets) -> Self {
        self.generic_targets = targets;
        self
    }

    pub fn inventory(&self) -> &ApplicationInventory {
        &self.inventory
    }

    pub fn aid_id(&self) -> &str {
        self.aid.id()
    }

    /// Resolve one transcript. Never fails: every failure is carried in the returned command.
    pub async fn resolve(&self, transcript: &str) -> Command {
        let snapshot = self.inventory.snapshot().unwrap_or_else(|error| {
            tracing::warn!("resolving without inventory: {error}");
            InventorySnapshot::default()
        });

        let rule = self.classify(transcript, &snapshot);
        if rule.is_executable() || !self.aid.is_available() {
            return rule;
        }

        let Some(response) = self.consult(transcript, &snapshot).await else {
            return rule;
        };
        match self.interpret(&response, transcript, &snapshot) {
            Some(command) => {
                tracing::debug!("generative aid resolved {transcript:?} to {command}");
                command
            }
            None => {
                tracing::debug!("generative aid reply {response:?} matched no command");
                rule
            }
        }
    }

    /// Keyword classification of `transcript` against `snapshot`.
    pub fn classify(&self, transcript: &str, snapshot: &InventorySnapshot) -> Command {
        let lowered = transcript.to_lowercase();
        let tokens = keywords::tokenize(&lowered);
        match keywords::classify(&tokens) {
            Some(Bucket::Open) => {
                if let Some(entry) = snapshot.find_in(open_remainder(&lowered)) {
                    return Command::open(entry.name.to_lowercase(), Some(entry.path.clone()));
                }
                match GenericApp::detect(&tokens) {
                    Some(app) => Command::open(app.name(), self.generic_path(app)),
                    None => Command::unresolved_open(),
                }
            }
            Some(Bucket::Lock) => Command::LockScreen,
            Some(Bucket::Play) => Command::PlayMedia,
            Some(Bucket::Pause) => Command::PauseMedia,
            None => Command::unrecognized(transcript),
        }
    }

    /// Map a generative aid reply onto the vocabulary. `None` when no pattern occurs in it.
    ///
    /// An open match never trusts the reply for the application: the name is looked up from
    /// the original transcript, and a miss becomes an explicit validation error.
    pub fn interpret(
        &self,
        response: &str,
        transcript: &str,
        snapshot: &InventorySnapshot,
    ) -> Option<Command> {
        let entry = vocabulary::match_response(response)?;
        let command = match entry.intent {
            Intent::Open => {
                let lowered = transcript.to_lowercase();
                match snapshot.find_in(open_remainder(&lowered)) {
                    Some(entry) => {
                        Command::open(entry.name.to_lowercase(), Some(entry.path.clone()))
                    }
                    None => Command::invalid_open(),
                }
            }
            Intent::LockScreen => Command::LockScreen,
            Intent::PlayMedia => Command::PlayMedia,
            Intent::PauseMedia => Command::PauseMedia,
        };
        Some(command)
    }

    async fn consult(&self, transcript: &str, snapshot: &InventorySnapshot) -> Option<String> {
        let prompt = self.prompt.render(&snapshot.joined_names(), transcript);
        let call = self.aid.generate(&prompt, &self.params);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) if !response.trim().is_empty() => Some(response),
            Ok(Ok(_)) => {
                tracing::debug!("generative aid {} returned nothing", self.aid.id());
                None
            }
            Ok(Err(error)) => {
                tracing::warn!("generative aid {} failed: {error}", self.aid.id());
                None
            }
            Err(_) => {
                tracing::warn!(
                    "generative aid {} timed out after {} ms",
                    self.aid.id(),
                    self.timeout.as_millis()
                );
                None
            }
        }
    }

    fn generic_path(&self, app: GenericApp) -> Option<String> {
        let target = match app {
            GenericApp::Notepad => &self.generic_targets.notepad,
            GenericApp::Calculator => &self.generic_targets.calculator,
            GenericApp::Browser => &self.generic_targets.browser,
        };
        target.clone().filter(|path| !path.trim().is_empty())
    }
}
