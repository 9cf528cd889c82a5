//! Properties every reachable session satisfies.
//!
//! Each invariant is a zero-sized type so that sets of them can be composed
//! as tuples and checked in one call after every transition.

use super::session::GameSession;
use super::stage::{BATCH_SIZE, StageSequence};

/// A session viewed together with the sequence it runs against.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    /// Stage sequence in force.
    pub sequence: &'a StageSequence,
    /// Session under inspection.
    pub session: &'a GameSession,
}

impl<'a> SessionContext<'a> {
    /// Pairs a session with its sequence.
    pub fn new(sequence: &'a StageSequence, session: &'a GameSession) -> Self {
        Self { sequence, session }
    }
}

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together.
pub trait InvariantSet<S> {
    /// Returns every violated invariant, or `Ok(())` if all hold.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }
        if !I4::holds(state) {
            violations.push(InvariantViolation::new(I4::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// The stage index points into the sequence.
pub struct StageIndexInRange;

impl<'a> Invariant<SessionContext<'a>> for StageIndexInRange {
    fn holds(ctx: &SessionContext<'a>) -> bool {
        ctx.session.current_stage_index < ctx.sequence.len()
    }

    fn description() -> &'static str {
        "Stage index lies within the stage sequence"
    }
}

/// Group counters are bounded and only live inside the group stage.
pub struct GroupCountersBounded;

impl<'a> Invariant<SessionContext<'a>> for GroupCountersBounded {
    fn holds(ctx: &SessionContext<'a>) -> bool {
        let s = ctx.session;
        let in_group = ctx
            .sequence
            .get(s.current_stage_index)
            .is_some_and(|def| def.stage.is_group());

        if !in_group {
            return s.group_stage_matches_played == 0 && s.group_stage_total_points == 0;
        }

        let matches = ctx.sequence.group().matches;
        let max_points = (s.group_stage_matches_played + 1) * BATCH_SIZE as u32;
        s.group_stage_matches_played <= matches && s.group_stage_total_points <= max_points
    }

    fn description() -> &'static str {
        "Group matches never exceed the match count and points never exceed questions played"
    }
}

/// Stage score fits a batch and never exceeds what the totals allow.
pub struct ScoresConsistent;

impl<'a> Invariant<SessionContext<'a>> for ScoresConsistent {
    fn holds(ctx: &SessionContext<'a>) -> bool {
        let s = ctx.session;
        s.stage_score as usize <= BATCH_SIZE
            && s.total_score >= s.stage_score
            && s.total_score >= s.group_stage_total_points
    }

    fn description() -> &'static str {
        "Stage score fits one batch and total score covers stage and group points"
    }
}

/// Finished games carry a summary and no pending tie-break.
pub struct TerminalIsSettled;

impl<'a> Invariant<SessionContext<'a>> for TerminalIsSettled {
    fn holds(ctx: &SessionContext<'a>) -> bool {
        let s = ctx.session;
        if s.is_over() {
            s.summary.is_some() && s.extra_time.is_none()
        } else {
            s.summary.is_none()
        }
    }

    fn description() -> &'static str {
        "A game has a summary exactly when it is over, and never ends mid tie-break"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    StageIndexInRange,
    GroupCountersBounded,
    ScoresConsistent,
    TerminalIsSettled,
);
