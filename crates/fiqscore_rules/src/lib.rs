//! FIQScore rules - stage progression and scoring for the football quiz.
//!
//! A tournament is a fixed sequence of stages. The group stage is four
//! eight-question matches judged on accumulated points; every later stage is
//! one eight-question batch judged against a pass threshold. Scoring exactly
//! on a threshold sends the player to extra time: a single sudden-death
//! question.
//!
//! # Architecture
//!
//! - **Session**: [`GameSession`], the complete progression state
//! - **Machine**: [`StageMachine::apply`], a pure `(session, event) -> (session, effects)`
//! - **Effects**: [`Effect`] values the caller interprets (fetches, outcome)
//! - **Contracts**: pre/postconditions and invariants checked around each transition
//!
//! # Example
//!
//! ```
//! use fiqscore_rules::{Effect, Event, Stage, StageMachine};
//!
//! let machine = StageMachine::default();
//! let start = machine.start();
//! assert_eq!(start.effects, vec![Effect::FetchBatch { stage: Stage::GroupStage }]);
//!
//! let next = machine
//!     .apply(start.session, Event::RecordAnswer { correct: true })
//!     .unwrap();
//! assert_eq!(next.session.stage_score(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
mod difficulty;
mod error;
mod invariants;
mod machine;
mod session;
mod stage;

pub use action::{Effect, Event};
pub use contracts::{Contract, EventFitsPhase, GameStillRunning, TransitionContract};
pub use difficulty::Difficulty;
pub use error::RulesError;
pub use invariants::{
    GroupCountersBounded, Invariant, InvariantSet, InvariantViolation, ScoresConsistent,
    SessionContext, SessionInvariants, StageIndexInRange, TerminalIsSettled,
};
pub use machine::{StageMachine, Transition};
pub use session::{Destination, GameSession, Outcome};
pub use stage::{
    BATCH_SIZE, GROUP_MATCHES, GroupRules, PLAYOFF_THRESHOLD, ROUND_OF_16_THRESHOLD, Stage,
    StageDefinition, StageSequence,
};
