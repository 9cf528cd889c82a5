//! Error types for the quiz client.

use derive_more::{Display, Error, From};
use fiqscore_rules::RulesError;
use tracing::instrument;

/// Invalid tournament selection at game start.
///
/// Raised before any state mutation or fetch; the player must fix the input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SelectionError {
    /// Neither single nor custom mixing was chosen.
    #[display("Please select a tournament type (Single or Custom Mixing).")]
    MissingType,

    /// Single mode without a tournament.
    #[display("Please select a single tournament.")]
    MissingSingle,

    /// Custom mixing with a missing or repeated tournament.
    #[display("Please select two *different* tournaments for custom mixing.")]
    InvalidMix,

    /// A tournament outside the configured list.
    #[display("{} is not an available tournament.", _0)]
    UnknownTournament(String),
}

impl std::error::Error for SelectionError {}

/// What went wrong while fetching questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SupplyErrorKind {
    /// The request never produced a response.
    #[display("transport")]
    Transport,
    /// The supply answered with a non-success status.
    #[display("status")]
    Status,
    /// The supply answered with no questions.
    #[display("empty")]
    Empty,
    /// The payload could not be decoded or a question is inconsistent.
    #[display("malformed")]
    Malformed,
}

/// Failure to obtain usable questions. Recoverable: the game freezes until restarted.
#[derive(Debug, Clone, Display, Error)]
#[display("Supply error ({}): {} at {}:{}", kind, message, file, line)]
pub struct SupplyError {
    /// Category of the failure.
    pub kind: SupplyErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SupplyError {
    /// Creates a new supply error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: SupplyErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Message suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self.kind {
            SupplyErrorKind::Empty => {
                "No questions found for this selection. Try a different tournament or stage."
                    .to_string()
            }
            _ => format!("Failed to load questions: {}.", self.message),
        }
    }
}

impl From<reqwest::Error> for SupplyError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            SupplyErrorKind::Malformed
        } else {
            SupplyErrorKind::Transport
        };
        Self::new(kind, err.to_string())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<RulesError> for ConfigError {
    #[track_caller]
    fn from(err: RulesError) -> Self {
        Self::new(err.to_string())
    }
}

/// Error surfaced by [`crate::SessionController`] operations.
#[derive(Debug, Clone, Display, From)]
pub enum ControllerError {
    /// Tournament selection rejected.
    #[display("{}", _0)]
    Selection(SelectionError),
    /// Questions could not be loaded.
    #[display("{}", _0)]
    Supply(SupplyError),
    /// The stage machine refused a transition.
    #[display("{}", _0)]
    Rules(RulesError),
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::Selection(e) => Some(e),
            ControllerError::Supply(e) => Some(e),
            ControllerError::Rules(e) => Some(e),
        }
    }
}
