//! Inputs to and outputs from the stage machine.
//!
//! Events describe what happened at the quiz table; effects describe what
//! the caller has to do about it. The machine itself never performs I/O.

use super::session::Outcome;
use super::stage::Stage;
use serde::{Deserialize, Serialize};

/// Something the controller reports to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A question was scored. In extra time this resolves the tie-break.
    RecordAnswer {
        /// Whether the submitted option was the designated correct one.
        correct: bool,
    },
    /// The current batch has no questions left.
    Advance,
}

/// Work the controller must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Load a fresh batch of regular questions.
    FetchBatch {
        /// Stage to request questions for.
        stage: Stage,
    },
    /// Load one sudden-death question of random difficulty.
    FetchExtraTime {
        /// Stage whose tie is being broken.
        stage: Stage,
    },
    /// The player moved on to another stage.
    StageAdvanced {
        /// Stage just completed.
        from: Stage,
        /// Stage now being played.
        to: Stage,
        /// True when the move was earned in extra time.
        via_extra_time: bool,
    },
    /// The game reached a terminal outcome.
    GameEnded {
        /// `Won` or `Lost`.
        outcome: Outcome,
        /// Human-readable explanation.
        summary: String,
    },
}

impl Effect {
    /// Returns true for effects that require a question fetch.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Effect::FetchBatch { .. } | Effect::FetchExtraTime { .. })
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::FetchBatch { stage } => write!(f, "fetch batch for {}", stage),
            Effect::FetchExtraTime { stage } => write!(f, "fetch extra time for {}", stage),
            Effect::StageAdvanced { from, to, via_extra_time } => {
                write!(f, "{} -> {}", from, to)?;
                if *via_extra_time {
                    write!(f, " (extra time)")?;
                }
                Ok(())
            }
            Effect::GameEnded { outcome, .. } => write!(f, "game ended: {:?}", outcome),
        }
    }
}
