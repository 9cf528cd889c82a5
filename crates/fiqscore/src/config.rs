//! Game configuration loaded from TOML.

use crate::error::ConfigError;
use derive_getters::Getters;
use fiqscore_rules::{GroupRules, StageDefinition, StageSequence};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Settings for a quiz client.
///
/// Every field has a default, so an empty file (or no file) yields the
/// standard six-stage tournament.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Question endpoint. When absent the built-in question bank is used.
    #[serde(default)]
    supply_url: Option<String>,

    /// Tournaments a player may choose from.
    #[serde(default = "default_tournaments")]
    tournaments: Vec<String>,

    /// Pause after an answer before the next question, in milliseconds.
    #[serde(default = "default_feedback_delay_ms")]
    feedback_delay_ms: u64,

    /// Group-stage thresholds.
    #[serde(default)]
    group: GroupRules,

    /// Stage list in tournament order.
    #[serde(default = "default_stages")]
    stages: Vec<StageDefinition>,
}

#[instrument]
fn default_tournaments() -> Vec<String> {
    vec!["FIFA World Cup".to_string(), "Premier League".to_string()]
}

#[instrument]
fn default_feedback_delay_ms() -> u64 {
    1500
}

fn default_stages() -> Vec<StageDefinition> {
    StageSequence::default().stages().to_vec()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            supply_url: None,
            tournaments: default_tournaments(),
            feedback_delay_ms: default_feedback_delay_ms(),
            group: GroupRules::default(),
            stages: default_stages(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            stages = config.stages.len(),
            tournaments = config.tournaments.len(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text and validates the stage list.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.stage_sequence()?;
        if config.tournaments.is_empty() {
            warn!("No tournaments configured; any tournament name will be accepted");
        }
        Ok(config)
    }

    /// Replaces the question endpoint.
    pub fn with_supply_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.supply_url = url;
        }
        self
    }

    /// Replaces the feedback pause.
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Pause after an answer before the next question.
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    /// Builds the validated stage sequence.
    pub fn stage_sequence(&self) -> Result<StageSequence, ConfigError> {
        Ok(StageSequence::new(self.stages.clone(), self.group)?)
    }
}
