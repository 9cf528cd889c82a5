//! Mutable progression state of a single game.

use serde::{Deserialize, Serialize};

/// Terminal status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Questions are still being played.
    InProgress,
    /// The final stage was passed.
    Won,
    /// The player was eliminated.
    Lost,
}

impl Outcome {
    /// Returns true for `Won` and `Lost`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Where a correct extra-time answer takes the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Continue at the stage with this index.
    Stage(usize),
    /// The tie was in the last stage: winning it wins the tournament.
    Champion,
}

/// Root state of a game, advanced only by [`crate::StageMachine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub(crate) current_stage_index: usize,
    pub(crate) stage_score: u32,
    pub(crate) total_score: u32,
    pub(crate) group_stage_matches_played: u32,
    pub(crate) group_stage_total_points: u32,
    pub(crate) extra_time: Option<Destination>,
    pub(crate) outcome: Outcome,
    pub(crate) summary: Option<String>,
}

impl GameSession {
    /// Creates a session positioned at the first stage with all counters at zero.
    pub fn new() -> Self {
        Self {
            current_stage_index: 0,
            stage_score: 0,
            total_score: 0,
            group_stage_matches_played: 0,
            group_stage_total_points: 0,
            extra_time: None,
            outcome: Outcome::InProgress,
            summary: None,
        }
    }

    /// Index into the stage sequence.
    pub fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    /// Correct answers in the current scored set.
    pub fn stage_score(&self) -> u32 {
        self.stage_score
    }

    /// Correct answers over the whole game.
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Group matches completed so far.
    pub fn group_stage_matches_played(&self) -> u32 {
        self.group_stage_matches_played
    }

    /// Points accumulated across group matches.
    pub fn group_stage_total_points(&self) -> u32 {
        self.group_stage_total_points
    }

    /// True while a sudden-death question is pending.
    pub fn in_extra_time(&self) -> bool {
        self.extra_time.is_some()
    }

    /// Where winning the pending tie-break leads, if one is pending.
    pub fn extra_time_destination(&self) -> Option<Destination> {
        self.extra_time
    }

    /// Current outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns true once the game is won or lost.
    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Explanation of a terminal outcome.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
