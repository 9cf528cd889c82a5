//! Pre- and postconditions around each stage-machine transition.

use super::action::Event;
use super::error::RulesError;
use super::invariants::{InvariantSet, SessionContext, SessionInvariants};
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), RulesError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), RulesError>;
}

/// Precondition: the game has not ended.
pub struct GameStillRunning;

impl GameStillRunning {
    /// Fails with `GameOver` once the session is won or lost.
    #[instrument(skip(ctx))]
    pub fn check(ctx: &SessionContext<'_>) -> Result<(), RulesError> {
        if ctx.session.is_over() {
            warn!(outcome = ?ctx.session.outcome(), "Event received after game end");
            Err(RulesError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: `Advance` is meaningless while a tie-break question is pending.
pub struct EventFitsPhase;

impl EventFitsPhase {
    /// Fails with `UnexpectedEvent` for `Advance` during extra time.
    #[instrument(skip(ctx))]
    pub fn check(ctx: &SessionContext<'_>, event: &Event) -> Result<(), RulesError> {
        if matches!(event, Event::Advance) && ctx.session.in_extra_time() {
            Err(RulesError::UnexpectedEvent(
                *event,
                "extra time resolves on the answer itself",
            ))
        } else {
            Ok(())
        }
    }
}

/// Contract for every event applied by [`crate::StageMachine`].
///
/// Preconditions:
/// - Game still running
/// - Event valid for the current phase
///
/// Postconditions:
/// - All session invariants hold
/// - Total score never decreases
pub struct TransitionContract;

impl<'a> Contract<SessionContext<'a>, Event> for TransitionContract {
    fn pre(ctx: &SessionContext<'a>, event: &Event) -> Result<(), RulesError> {
        GameStillRunning::check(ctx)?;
        EventFitsPhase::check(ctx, event)
    }

    fn post(before: &SessionContext<'a>, after: &SessionContext<'a>) -> Result<(), RulesError> {
        if after.session.total_score() < before.session.total_score() {
            return Err(RulesError::InvariantViolation(
                "Postcondition failed: total score decreased".to_string(),
            ));
        }

        SessionInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            RulesError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Destination, GameSession, Outcome};
    use crate::stage::StageSequence;

    #[test]
    fn test_precondition_rejects_finished_game() {
        let seq = StageSequence::default();
        let mut session = GameSession::new();
        session.outcome = Outcome::Won;
        session.summary = Some("done".to_string());

        let ctx = SessionContext::new(&seq, &session);
        assert_eq!(
            TransitionContract::pre(&ctx, &Event::Advance),
            Err(RulesError::GameOver)
        );
    }

    #[test]
    fn test_precondition_rejects_advance_in_extra_time() {
        let seq = StageSequence::default();
        let mut session = GameSession::new();
        session.extra_time = Some(Destination::Champion);

        let ctx = SessionContext::new(&seq, &session);
        assert!(matches!(
            TransitionContract::pre(&ctx, &Event::Advance),
            Err(RulesError::UnexpectedEvent(Event::Advance, _))
        ));
        assert!(TransitionContract::pre(&ctx, &Event::RecordAnswer { correct: true }).is_ok());
    }

    #[test]
    fn test_postcondition_detects_score_decrease() {
        let seq = StageSequence::default();
        let mut before = GameSession::new();
        before.total_score = 5;
        let after = GameSession::new();

        let result = TransitionContract::post(
            &SessionContext::new(&seq, &before),
            &SessionContext::new(&seq, &after),
        );
        assert!(matches!(result, Err(RulesError::InvariantViolation(_))));
    }
}
