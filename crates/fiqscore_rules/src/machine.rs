//! Stage-progression and scoring transitions.
//!
//! [`StageMachine::apply`] is a pure function of a session and an event.
//! It returns the next session together with the effects the caller has to
//! carry out (fetching questions, announcing the outcome). Nothing here
//! performs I/O, so every branch of the tournament can be exercised
//! directly in tests.

use super::action::{Effect, Event};
use super::contracts::{Contract, TransitionContract};
use super::error::RulesError;
use super::invariants::SessionContext;
use super::session::{Destination, GameSession, Outcome};
use super::stage::{Stage, StageSequence};
use tracing::{debug, info, instrument};

/// A session after an event, plus the work the event caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The updated session.
    pub session: GameSession,
    /// Effects to interpret, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(session: GameSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    /// Returns the terminal effect, if the transition ended the game.
    pub fn ended(&self) -> Option<(Outcome, &str)> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::GameEnded { outcome, summary } => Some((*outcome, summary.as_str())),
            _ => None,
        })
    }
}

/// Applies tournament rules to game sessions.
#[derive(Debug, Clone, Default)]
pub struct StageMachine {
    sequence: StageSequence,
}

impl StageMachine {
    /// Creates a machine for the given stage sequence.
    #[instrument(skip(sequence), fields(stages = sequence.len()))]
    pub fn new(sequence: StageSequence) -> Self {
        Self { sequence }
    }

    /// The stage sequence this machine enforces.
    pub fn sequence(&self) -> &StageSequence {
        &self.sequence
    }

    /// Stage the session is currently playing.
    pub fn current_stage(&self, session: &GameSession) -> Result<Stage, RulesError> {
        Ok(self.sequence.definition(session.current_stage_index)?.stage)
    }

    /// Starts a new game: a fresh session and a request for the first batch.
    #[instrument(skip(self))]
    pub fn start(&self) -> Transition {
        let session = GameSession::new();
        let first = self.sequence.stages()[0].stage;
        info!(stage = %first, "Starting new game");
        Transition {
            session,
            effects: vec![Effect::FetchBatch { stage: first }],
        }
    }

    /// Applies an event to a session.
    ///
    /// # Errors
    ///
    /// - `GameOver` if the session is already won or lost
    /// - `UnexpectedEvent` for `Advance` during extra time
    /// - `InvalidConfiguration` if the current stage lacks a pass threshold
    ///   or the group stage routes to a stage missing from the sequence
    /// - `InvariantViolation` if a postcondition fails (debug builds)
    #[instrument(skip(self, session), fields(
        stage_index = session.current_stage_index,
        stage_score = session.stage_score,
        extra_time = session.in_extra_time(),
    ))]
    pub fn apply(&self, session: GameSession, event: Event) -> Result<Transition, RulesError> {
        TransitionContract::pre(&SessionContext::new(&self.sequence, &session), &event)?;

        #[cfg(debug_assertions)]
        let before = session.clone();

        let transition = match event {
            Event::RecordAnswer { correct } if session.in_extra_time() => {
                self.resolve_extra_time(session, correct)?
            }
            Event::RecordAnswer { correct } => self.record_answer(session, correct)?,
            Event::Advance => self.evaluate(session)?,
        };

        #[cfg(debug_assertions)]
        TransitionContract::post(
            &SessionContext::new(&self.sequence, &before),
            &SessionContext::new(&self.sequence, &transition.session),
        )?;

        for effect in &transition.effects {
            debug!(%effect, "Transition effect");
        }

        Ok(transition)
    }

    fn record_answer(&self, mut session: GameSession, correct: bool) -> Result<Transition, RulesError> {
        if correct {
            session.stage_score += 1;
            session.total_score += 1;
            if self.current_stage(&session)?.is_group() {
                session.group_stage_total_points += 1;
            }
        }
        debug!(
            correct,
            stage_score = session.stage_score,
            total_score = session.total_score,
            "Answer recorded"
        );
        Ok(Transition::quiet(session))
    }

    fn evaluate(&self, session: GameSession) -> Result<Transition, RulesError> {
        if self.current_stage(&session)?.is_group() {
            self.evaluate_group(session)
        } else {
            self.evaluate_knockout(session)
        }
    }

    fn evaluate_group(&self, mut session: GameSession) -> Result<Transition, RulesError> {
        let rules = *self.sequence.group();
        session.group_stage_matches_played += 1;
        session.stage_score = 0;

        info!(
            matches_played = session.group_stage_matches_played,
            points = session.group_stage_total_points,
            "Group match finished"
        );

        if session.group_stage_matches_played < rules.matches {
            return Ok(Transition {
                session,
                effects: vec![Effect::FetchBatch {
                    stage: Stage::GroupStage,
                }],
            });
        }

        let points = session.group_stage_total_points;
        let round_of_16 = Destination::Stage(self.sequence.index_of(Stage::RoundOf16)?);
        let playoff = Destination::Stage(self.sequence.index_of(Stage::PlayOff)?);

        if points > rules.round_of_16_threshold {
            Ok(self.advance_to(session, round_of_16, false))
        } else if points == rules.round_of_16_threshold {
            self.enter_extra_time(session, round_of_16)
        } else if points > rules.playoff_threshold {
            Ok(self.advance_to(session, playoff, false))
        } else if points == rules.playoff_threshold {
            self.enter_extra_time(session, playoff)
        } else {
            let summary = format!(
                "You scored {} points in the Group Stage. You needed {} to make the Play-off or {} to pass directly to the Round of 16. Game Over.",
                points, rules.playoff_threshold, rules.round_of_16_threshold
            );
            Ok(Self::finish(session, Outcome::Lost, summary))
        }
    }

    fn evaluate_knockout(&self, session: GameSession) -> Result<Transition, RulesError> {
        let index = session.current_stage_index;
        let stage = self.current_stage(&session)?;
        let threshold = self.sequence.pass_threshold(index)?;
        let score = session.stage_score;

        info!(%stage, score, threshold, "Knockout stage finished");

        let next = if index == self.sequence.last_index() {
            Destination::Champion
        } else {
            Destination::Stage(index + 1)
        };

        if score > threshold {
            Ok(self.advance_to(session, next, false))
        } else if score == threshold {
            self.enter_extra_time(session, next)
        } else {
            let summary = format!(
                "You didn't pass the {}. You needed {} correct answers, but only got {}. Game Over.",
                stage, threshold, score
            );
            Ok(Self::finish(session, Outcome::Lost, summary))
        }
    }

    fn enter_extra_time(
        &self,
        mut session: GameSession,
        destination: Destination,
    ) -> Result<Transition, RulesError> {
        let stage = self.current_stage(&session)?;
        info!(%stage, ?destination, "Tie on threshold, going to extra time");
        session.extra_time = Some(destination);
        session.stage_score = 0;
        Ok(Transition {
            session,
            effects: vec![Effect::FetchExtraTime { stage }],
        })
    }

    fn resolve_extra_time(
        &self,
        mut session: GameSession,
        correct: bool,
    ) -> Result<Transition, RulesError> {
        let stage = self.current_stage(&session)?;
        let destination = session.extra_time.take().ok_or(RulesError::UnexpectedEvent(
            Event::RecordAnswer { correct },
            "no extra time pending",
        ))?;

        if correct {
            info!(%stage, "Extra time won");
            Ok(self.advance_to(session, destination, true))
        } else {
            info!(%stage, "Extra time lost");
            let summary = format!("You didn't pass the {} in extra time. Game Over.", stage);
            Ok(Self::finish(session, Outcome::Lost, summary))
        }
    }

    fn advance_to(
        &self,
        mut session: GameSession,
        destination: Destination,
        via_extra_time: bool,
    ) -> Transition {
        session.stage_score = 0;
        session.group_stage_matches_played = 0;
        session.group_stage_total_points = 0;

        match destination {
            Destination::Champion => {
                let summary = if via_extra_time {
                    "You have won the FIQScore Tournament after extra time!"
                } else {
                    "You have won the FIQScore Tournament!"
                };
                Self::finish(session, Outcome::Won, summary.to_string())
            }
            Destination::Stage(index) => {
                let from = self.sequence.stages()[session.current_stage_index].stage;
                let to = self.sequence.stages()[index].stage;
                session.current_stage_index = index;
                info!(%from, %to, via_extra_time, "Advancing to next stage");
                Transition {
                    session,
                    effects: vec![
                        Effect::StageAdvanced {
                            from,
                            to,
                            via_extra_time,
                        },
                        Effect::FetchBatch { stage: to },
                    ],
                }
            }
        }
    }

    fn finish(mut session: GameSession, outcome: Outcome, summary: String) -> Transition {
        info!(?outcome, total_score = session.total_score, %summary, "Game over");
        session.outcome = outcome;
        session.extra_time = None;
        session.summary = Some(summary.clone());
        Transition {
            session,
            effects: vec![Effect::GameEnded { outcome, summary }],
        }
    }
}
