//! Session controller: glues questions, countdowns and the stage machine.
//!
//! The controller owns every piece of mutable game state and is driven by
//! `&mut self` calls from one task. Question fetches are awaited inline so
//! at most one is outstanding. Countdown expiries arrive on the channel
//! returned by [`SessionController::new`] and are fed back through
//! [`SessionController::on_timeout`].

use crate::config::GameConfig;
use crate::error::{ConfigError, ControllerError, SelectionError, SupplyError, SupplyErrorKind};
use crate::messages::random_challenge;
use crate::question::{Question, QuestionBatch};
use crate::selection::{SelectionForm, TournamentSelection};
use crate::supply::{QuestionRequest, QuestionSupply};
use crate::timer::{Countdown, TimerExpired};
use crate::view::{Feedback, SessionView, Status};
use fiqscore_rules::{BATCH_SIZE, Difficulty, Effect, Event, GameSession, Stage, StageMachine, Transition};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, instrument, warn};

/// Drives one player's game from selection to outcome.
pub struct SessionController<S: QuestionSupply> {
    supply: S,
    config: GameConfig,
    machine: StageMachine,
    rng: StdRng,

    selection: Option<TournamentSelection>,
    session: Option<GameSession>,
    batch: Option<QuestionBatch>,
    extra_time_question: Option<Question>,

    selected: Option<String>,
    feedback: Option<Feedback>,
    awaiting_continue: bool,
    countdown: Countdown,

    loading: bool,
    failed: bool,
    message: Option<String>,
    challenge: &'static str,
}

impl<S: QuestionSupply> std::fmt::Debug for SessionController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("selection", &self.selection)
            .field("session", &self.session)
            .field("feedback", &self.feedback)
            .field("loading", &self.loading)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<S: QuestionSupply> SessionController<S> {
    /// Creates an idle controller.
    ///
    /// Returns the receiver on which countdown expiries are delivered.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured stage list is invalid.
    #[instrument(skip_all)]
    pub fn new(
        supply: S,
        config: GameConfig,
    ) -> Result<(Self, UnboundedReceiver<TimerExpired>), ConfigError> {
        let machine = StageMachine::new(config.stage_sequence()?);
        let mut rng = StdRng::from_entropy();
        let challenge = random_challenge(&mut rng);
        let (countdown, rx) = Countdown::channel();

        info!(
            stages = machine.sequence().len(),
            feedback_delay_ms = config.feedback_delay_ms(),
            "Session controller ready"
        );

        Ok((
            Self {
                supply,
                config,
                machine,
                rng,
                selection: None,
                session: None,
                batch: None,
                extra_time_question: None,
                selected: None,
                feedback: None,
                awaiting_continue: false,
                countdown,
                loading: false,
                failed: false,
                message: None,
                challenge,
            },
            rx,
        ))
    }

    /// Replaces the random source (difficulty picks, challenge lines).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self.challenge = random_challenge(&mut self.rng);
        self
    }

    // ─────────────────────────────────────────────────────────────
    //  Interaction points
    // ─────────────────────────────────────────────────────────────

    /// Validates the selection, resets all state and loads the first batch.
    ///
    /// An invalid selection is rejected before anything changes.
    #[instrument(skip(self))]
    pub async fn start_session(&mut self, form: &SelectionForm) -> Result<(), ControllerError> {
        let selection = form.validate(self.config.tournaments()).inspect_err(|e| {
            warn!(error = %e, "Selection rejected");
        })?;

        info!(%selection, "Starting session");
        self.reset();
        self.selection = Some(selection);

        let transition = self.machine.start();
        self.commit(transition).await
    }

    /// Highlights an option before submission. Ignored once the question is answered.
    #[instrument(skip(self))]
    pub fn select_option(&mut self, option: &str) -> bool {
        if self.feedback.is_some() || self.loading || self.failed {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        if !question.options.iter().any(|o| o == option) {
            debug!("Option not offered by current question");
            return false;
        }
        self.selected = Some(option.to_string());
        true
    }

    /// Scores an answer to the current question.
    ///
    /// `None` or `is_timeout` count as no answer. Returns `Ok(None)` when
    /// there is nothing to answer: no question, already answered, loading,
    /// failed or finished.
    ///
    /// Extra-time answers resolve the tie-break immediately. Regular answers
    /// update the scores and leave the feedback on screen until
    /// [`continue_after_feedback`](Self::continue_after_feedback).
    #[instrument(skip(self))]
    pub async fn submit_answer(
        &mut self,
        answer: Option<String>,
        is_timeout: bool,
    ) -> Result<Option<Feedback>, ControllerError> {
        if self.loading || self.failed || self.feedback.is_some() {
            debug!("Submission ignored");
            return Ok(None);
        }
        let Some(session) = self.session.clone() else {
            return Ok(None);
        };
        if session.is_over() {
            return Ok(None);
        }
        let Some(question) = self.current_question().cloned() else {
            return Ok(None);
        };

        self.countdown.cancel();

        let answer = if is_timeout { None } else { answer };
        let feedback = match &answer {
            None => Feedback::NoAnswer,
            Some(a) if question.is_correct(a) => Feedback::Correct,
            Some(_) => Feedback::Incorrect,
        };
        info!(question_id = %question.id, %feedback, is_timeout, "Answer submitted");

        let in_extra_time = session.in_extra_time();
        let transition = self.machine.apply(
            session,
            Event::RecordAnswer {
                correct: feedback == Feedback::Correct,
            },
        )?;

        self.selected = answer;
        self.feedback = Some(feedback);

        if in_extra_time {
            self.commit(transition).await?;
        } else {
            self.session = Some(transition.session);
            self.awaiting_continue = true;
        }

        Ok(Some(feedback))
    }

    /// Waits out the feedback pause, then shows the next question or
    /// evaluates the finished batch.
    #[instrument(skip(self))]
    pub async fn continue_after_feedback(&mut self) -> Result<(), ControllerError> {
        if !self.awaiting_continue {
            return Ok(());
        }
        let delay = self.config.feedback_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.awaiting_continue = false;

        let Some(session) = self.session.clone() else {
            return Ok(());
        };

        if self.batch.as_mut().is_some_and(QuestionBatch::advance) {
            self.open_question();
            return Ok(());
        }

        debug!("Batch exhausted, evaluating stage");
        let transition = self.machine.apply(session, Event::Advance)?;
        self.commit(transition).await
    }

    /// Handles a countdown expiry. Stale expiries are ignored.
    #[instrument(skip(self), fields(question_id = %expired.question_id))]
    pub async fn on_timeout(
        &mut self,
        expired: TimerExpired,
    ) -> Result<Option<Feedback>, ControllerError> {
        if !self.countdown.matches(&expired) {
            debug!(ticket = expired.ticket, "Stale countdown expiry");
            return Ok(None);
        }
        warn!("Time is up");
        self.submit_answer(None, true).await
    }

    /// Back to the start screen: clears selection, session, questions and countdown.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) {
        info!("Resetting for a new game");
        self.reset();
        self.selection = None;
    }

    /// Extra-time question while in extra time, else the question under the cursor.
    pub fn current_question(&self) -> Option<&Question> {
        let session = self.session.as_ref()?;
        if session.in_extra_time() {
            self.extra_time_question.as_ref()
        } else {
            self.batch.as_ref().and_then(QuestionBatch::current)
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Read access
    // ─────────────────────────────────────────────────────────────

    /// Current progression state, once a game has started.
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Chosen tournaments.
    pub fn selection(&self) -> Option<&TournamentSelection> {
        self.selection.as_ref()
    }

    /// Error or end-of-game text.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Coarse screen state.
    pub fn status(&self) -> Status {
        if self.failed {
            Status::Failed
        } else if self.loading {
            Status::Loading
        } else if let Some(session) = &self.session {
            if session.is_over() {
                Status::Finished(session.outcome())
            } else if self.feedback.is_some() {
                Status::ShowingFeedback
            } else {
                Status::Answering
            }
        } else {
            Status::Idle
        }
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SessionView {
        let session = self.session.as_ref();
        let stage = session.and_then(|s| self.machine.current_stage(s).ok());
        let in_extra_time = session.is_some_and(GameSession::in_extra_time);
        let (question_number, batch_len) = match (&self.batch, in_extra_time) {
            (Some(batch), false) => (Some(batch.position() + 1), Some(batch.len())),
            _ => (None, None),
        };

        SessionView {
            status: self.status(),
            selection: self.selection.clone(),
            stage,
            stage_score: session.map_or(0, GameSession::stage_score),
            total_score: session.map_or(0, GameSession::total_score),
            group_stage_matches_played: session.map_or(0, GameSession::group_stage_matches_played),
            group_stage_total_points: session.map_or(0, GameSession::group_stage_total_points),
            in_extra_time,
            question_number,
            batch_len,
            question: self.current_question().cloned(),
            selected: self.selected.clone(),
            feedback: self.feedback,
            remaining_secs: self
                .countdown
                .remaining()
                .map(|d| d.as_secs_f64().ceil() as u64),
            message: self.message.clone(),
            challenge: self.challenge.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────────

    fn reset(&mut self) {
        self.countdown.cancel();
        self.session = None;
        self.batch = None;
        self.extra_time_question = None;
        self.selected = None;
        self.feedback = None;
        self.awaiting_continue = false;
        self.loading = false;
        self.failed = false;
        self.message = None;
        self.challenge = random_challenge(&mut self.rng);
    }

    /// Carries out a transition's effects, then installs its session.
    ///
    /// Fetches run before anything is installed, so a failed fetch leaves
    /// the previous session untouched.
    async fn commit(&mut self, transition: Transition) -> Result<(), ControllerError> {
        let Transition { session, effects } = transition;
        let mut next_batch = None;
        let mut next_extra = None;
        let mut ended = None;

        for effect in effects {
            match effect {
                Effect::FetchBatch { stage } => {
                    let request = self.request(stage, None)?;
                    let questions = self.load(request).await?;
                    next_batch = QuestionBatch::new(questions);
                }
                Effect::FetchExtraTime { stage } => {
                    let difficulty = Difficulty::pick(&mut self.rng);
                    info!(%stage, %difficulty, "Extra time question");
                    let request = self.request(stage, Some(difficulty))?;
                    let questions = self.load(request).await?;
                    next_extra = questions.into_iter().next();
                }
                Effect::StageAdvanced {
                    from,
                    to,
                    via_extra_time,
                } => {
                    info!(%from, %to, via_extra_time, "Stage passed");
                }
                Effect::GameEnded { outcome, summary } => {
                    info!(?outcome, "Game finished");
                    ended = Some(summary);
                }
            }
        }

        self.session = Some(session);
        self.awaiting_continue = false;

        if let Some(summary) = ended {
            self.countdown.cancel();
            self.extra_time_question = None;
            self.message = Some(summary);
            return Ok(());
        }

        if let Some(batch) = next_batch {
            self.batch = Some(batch);
            self.extra_time_question = None;
            self.open_question();
        } else if let Some(question) = next_extra {
            self.extra_time_question = Some(question);
            self.open_question();
        }
        Ok(())
    }

    fn request(
        &self,
        stage: Stage,
        difficulty: Option<Difficulty>,
    ) -> Result<QuestionRequest, ControllerError> {
        let tournaments = self
            .selection
            .clone()
            .ok_or(ControllerError::Selection(SelectionError::MissingType))?;
        Ok(QuestionRequest {
            stage,
            tournaments,
            difficulty,
        })
    }

    /// Fetches and checks questions. Any failure freezes the game.
    async fn load(&mut self, request: QuestionRequest) -> Result<Vec<Question>, ControllerError> {
        self.loading = true;
        let result = self.supply.fetch(&request).await;
        self.loading = false;

        let checked = result.and_then(|questions| {
            if questions.is_empty() {
                return Err(SupplyError::new(
                    SupplyErrorKind::Empty,
                    format!("no questions for {}", request.stage),
                ));
            }
            if request.difficulty.is_none() && questions.len() > BATCH_SIZE {
                return Err(SupplyError::new(
                    SupplyErrorKind::Malformed,
                    format!(
                        "{} questions for {}, at most {} expected",
                        questions.len(),
                        request.stage,
                        BATCH_SIZE
                    ),
                ));
            }
            if let Some(problem) = questions.iter().find_map(|q| q.validate().err()) {
                return Err(SupplyError::new(SupplyErrorKind::Malformed, problem));
            }
            Ok(questions)
        });

        checked.map_err(|e| {
            error!(error = %e, stage = %request.stage, "Question fetch failed");
            self.countdown.cancel();
            self.failed = true;
            self.message = Some(e.user_message());
            ControllerError::Supply(e)
        })
    }

    /// Clears answer state and starts the countdown for the current question.
    fn open_question(&mut self) {
        self.selected = None;
        self.feedback = None;

        let Some(session) = &self.session else {
            return;
        };
        let Ok(definition) = self.machine.sequence().definition(session.current_stage_index())
        else {
            return;
        };
        let limit = if session.in_extra_time() {
            definition.extra_time()
        } else {
            definition.timer()
        };

        let Some(id) = self.current_question().map(|q| q.id.clone()) else {
            return;
        };
        debug!(question_id = %id, limit_ms = limit.as_millis() as u64, "Question opened");
        self.countdown.start(&id, limit);
    }
}
