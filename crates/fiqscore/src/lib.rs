//! FIQScore - a football tournament quiz.
//!
//! The progression rules live in `fiqscore_rules`; this crate drives them.
//!
//! # Architecture
//!
//! - **Controller**: [`SessionController`] owns a game from selection to outcome
//! - **Supply**: [`QuestionSupply`] implemented over HTTP and by the in-process [`QuestionBank`]
//! - **Timer**: [`Countdown`] reports per-question expiries on a channel
//! - **Server**: the reference question endpoint ([`router`], [`serve`])
//!
//! # Example
//!
//! ```no_run
//! use fiqscore::{GameConfig, QuestionBank, SelectionForm, SessionController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (mut controller, mut expiries) =
//!     SessionController::new(QuestionBank::builtin(), GameConfig::default())?;
//! controller
//!     .start_session(&SelectionForm::single("FIFA World Cup"))
//!     .await?;
//!
//! if let Some(question) = controller.current_question() {
//!     let pick = question.options[0].clone();
//!     controller.submit_answer(Some(pick), false).await?;
//!     controller.continue_after_feedback().await?;
//! }
//! # let _ = expiries.try_recv();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod controller;
mod error;
mod messages;
mod question;
mod selection;
mod server;
mod supply;
mod timer;
mod view;

pub use config::GameConfig;
pub use controller::SessionController;
pub use error::{ConfigError, ControllerError, SelectionError, SupplyError, SupplyErrorKind};
pub use messages::{CHALLENGE_MESSAGES, random_challenge};
pub use question::{Question, QuestionBatch};
pub use selection::{SelectionForm, SelectionKind, TournamentSelection};
pub use server::{NETLIFY_PATH, QUESTIONS_PATH, QuestionQuery, router, serve};
pub use supply::{HttpQuestionSupply, QuestionBank, QuestionRequest, QuestionSupply};
pub use timer::{Countdown, TimerExpired};
pub use view::{Feedback, SessionView, Status};
