//! Read-only snapshot of a session for presentation.

use crate::question::Question;
use crate::selection::TournamentSelection;
use fiqscore_rules::{Outcome, Stage};
use serde::Serialize;

/// Result of the last submission, shown until the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// The selected option was correct.
    #[display("correct")]
    Correct,
    /// The selected option was wrong.
    #[display("incorrect")]
    Incorrect,
    /// Time ran out or nothing was selected.
    #[display("no_answer")]
    NoAnswer,
}

/// What the player is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Start screen; no game running.
    Idle,
    /// Waiting on the question supply.
    Loading,
    /// A question is open for an answer.
    Answering,
    /// Answer recorded; feedback on screen.
    ShowingFeedback,
    /// A fetch failed; the game is frozen until restarted.
    Failed,
    /// The game ended.
    Finished(Outcome),
}

/// Everything a renderer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Overall status.
    pub status: Status,
    /// Chosen tournaments.
    pub selection: Option<TournamentSelection>,
    /// Stage being played.
    pub stage: Option<Stage>,
    /// Correct answers in the current batch.
    pub stage_score: u32,
    /// Correct answers over the whole game.
    pub total_score: u32,
    /// Group matches completed.
    pub group_stage_matches_played: u32,
    /// Group points so far.
    pub group_stage_total_points: u32,
    /// True during a sudden-death question.
    pub in_extra_time: bool,
    /// One-based position within the batch.
    pub question_number: Option<usize>,
    /// Questions in the batch.
    pub batch_len: Option<usize>,
    /// Question on screen.
    pub question: Option<Question>,
    /// Option picked so far.
    pub selected: Option<String>,
    /// Outcome of the last submission.
    pub feedback: Option<Feedback>,
    /// Whole seconds left on the countdown.
    pub remaining_secs: Option<u64>,
    /// Error or end-of-game text.
    pub message: Option<String>,
    /// Start-screen taunt.
    pub challenge: String,
}
