//! Errors raised by the stage machine.

use super::action::Event;

/// Error returned when an event cannot be applied to a session.
///
/// None of these are recoverable at runtime: they indicate a broken stage
/// configuration or a controller that fed the machine out of order.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RulesError {
    /// The stage sequence lacks something the rules need.
    #[display("Invalid stage configuration: {}", _0)]
    InvalidConfiguration(String),

    /// The game already ended in a win or a loss.
    #[display("Game is already over")]
    GameOver,

    /// The event does not apply in the session's current phase.
    #[display("Unexpected event {:?}: {}", _0, _1)]
    UnexpectedEvent(Event, &'static str),

    /// A postcondition failed after a transition.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for RulesError {}
