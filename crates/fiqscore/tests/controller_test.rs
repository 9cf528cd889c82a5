//! Session controller tests against a scripted question supply.

use async_trait::async_trait;
use fiqscore::{
    ControllerError, Feedback, GameConfig, Question, QuestionRequest, QuestionSupply,
    SelectionError, SelectionForm, SessionController, Status, SupplyError, SupplyErrorKind,
    TimerExpired,
};
use fiqscore_rules::{BATCH_SIZE, Outcome, Stage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// ─────────────────────────────────────────────────────────────
//  Scripted supply
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Scripted {
    Empty,
    Error,
    Malformed,
    Oversized,
}

/// Serves eight `right`/`wrong` questions per batch and one per extra time.
/// Individual fetches (1-based) can be scripted to misbehave.
#[derive(Debug, Default)]
struct ScriptedSupply {
    requests: Mutex<Vec<QuestionRequest>>,
    script: HashMap<usize, Scripted>,
}

impl ScriptedSupply {
    fn with(script: &[(usize, Scripted)]) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            script: script.iter().copied().collect(),
        }
    }

    fn requests(&self) -> Vec<QuestionRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

fn question(id: String) -> Question {
    Question {
        id,
        question: "Which country won the FIFA World Cup in 2014?".to_string(),
        options: vec!["right".to_string(), "wrong".to_string(), "Germany".to_string()],
        correct_answer: "right".to_string(),
        kind: None,
    }
}

#[async_trait]
impl QuestionSupply for ScriptedSupply {
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError> {
        let n = {
            let mut requests = self.requests.lock().expect("lock");
            requests.push(request.clone());
            requests.len()
        };

        match self.script.get(&n) {
            Some(Scripted::Empty) => return Ok(Vec::new()),
            Some(Scripted::Error) => {
                return Err(SupplyError::new(SupplyErrorKind::Status, "HTTP error! status: 500"));
            }
            Some(Scripted::Malformed) => {
                let mut q = question("broken".to_string());
                q.correct_answer = "Spain".to_string();
                return Ok(vec![q]);
            }
            Some(Scripted::Oversized) => {
                return Ok((0..=BATCH_SIZE)
                    .map(|i| question(format!("extra-{}", i)))
                    .collect());
            }
            None => {}
        }

        if request.difficulty.is_some() {
            Ok(vec![question(format!("et-{}", n))])
        } else {
            Ok((0..BATCH_SIZE)
                .map(|i| question(format!("{}-{}", request.stage, i)))
                .collect())
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Helpers
// ─────────────────────────────────────────────────────────────

type Controller = SessionController<Arc<ScriptedSupply>>;

fn controller(
    supply: &Arc<ScriptedSupply>,
) -> (Controller, UnboundedReceiver<TimerExpired>) {
    let config = GameConfig::default().with_feedback_delay(Duration::ZERO);
    let (controller, rx) =
        SessionController::new(Arc::clone(supply), config).expect("default config is valid");
    (controller.with_rng(StdRng::seed_from_u64(42)), rx)
}

async fn started(supply: &Arc<ScriptedSupply>) -> (Controller, UnboundedReceiver<TimerExpired>) {
    let (mut c, rx) = controller(supply);
    c.start_session(&SelectionForm::single("FIFA World Cup"))
        .await
        .expect("session starts");
    (c, rx)
}

async fn answer(c: &mut Controller, correct: bool) -> Option<Feedback> {
    let pick = if correct { "right" } else { "wrong" };
    let feedback = c
        .submit_answer(Some(pick.to_string()), false)
        .await
        .expect("answer accepted");
    c.continue_after_feedback().await.expect("continue");
    feedback
}

async fn play_batch(c: &mut Controller, correct: usize) {
    for i in 0..BATCH_SIZE {
        answer(c, i < correct).await;
    }
}

async fn play_group(c: &mut Controller, scores: [usize; 4]) {
    for score in scores {
        play_batch(c, score).await;
    }
}

// ─────────────────────────────────────────────────────────────
//  Starting
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_loads_group_batch() {
    let supply = Arc::new(ScriptedSupply::default());
    let (c, _rx) = started(&supply).await;

    let view = c.view();
    assert_eq!(view.status, Status::Answering);
    assert_eq!(view.stage, Some(Stage::GroupStage));
    assert_eq!(view.question_number, Some(1));
    assert_eq!(view.batch_len, Some(BATCH_SIZE));
    assert!(view.remaining_secs.is_some_and(|s| s <= 90 && s >= 89));

    let requests = supply.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].stage, Stage::GroupStage);
    assert_eq!(requests[0].tournaments.primary(), "FIFA World Cup");
    assert_eq!(requests[0].difficulty, None);
}

#[tokio::test]
async fn test_identical_mix_rejected_without_fetch() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = controller(&supply);

    let err = c
        .start_session(&SelectionForm::custom("FIFA World Cup", "FIFA World Cup"))
        .await
        .expect_err("same tournament twice");

    assert!(matches!(err, ControllerError::Selection(SelectionError::InvalidMix)));
    assert!(supply.requests().is_empty());
    assert_eq!(c.status(), Status::Idle);
    assert!(c.session().is_none());
}

#[tokio::test]
async fn test_custom_mix_sends_both_tournaments() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = controller(&supply);
    c.start_session(&SelectionForm::custom("FIFA World Cup", "Premier League"))
        .await
        .expect("distinct mix starts");

    let pairs = supply.requests()[0].query_pairs();
    assert!(pairs.contains(&("tournament1", "FIFA World Cup".to_string())));
    assert!(pairs.contains(&("tournament2", "Premier League".to_string())));
}

// ─────────────────────────────────────────────────────────────
//  Answering
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_submission_is_ignored() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    let first = c
        .submit_answer(Some("right".to_string()), false)
        .await
        .expect("accepted");
    assert_eq!(first, Some(Feedback::Correct));
    assert_eq!(c.status(), Status::ShowingFeedback);

    let second = c
        .submit_answer(Some("right".to_string()), false)
        .await
        .expect("accepted");
    assert_eq!(second, None);
    assert_eq!(c.session().map(|s| s.stage_score()), Some(1));
    assert!(!c.select_option("wrong"));
}

#[tokio::test]
async fn test_cursor_moves_after_feedback() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    assert_eq!(answer(&mut c, false).await, Some(Feedback::Incorrect));
    let view = c.view();
    assert_eq!(view.status, Status::Answering);
    assert_eq!(view.question_number, Some(2));
    assert_eq!(view.feedback, None);
    assert_eq!(view.total_score, 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_scores_no_answer_even_with_selection() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, mut rx) = started(&supply).await;

    assert!(c.select_option("Germany"));
    let expired = rx.recv().await.expect("countdown fires");
    let feedback = c.on_timeout(expired).await.expect("timeout handled");

    assert_eq!(feedback, Some(Feedback::NoAnswer));
    assert_eq!(c.view().feedback, Some(Feedback::NoAnswer));
    assert_eq!(c.session().map(|s| s.stage_score()), Some(0));
}

#[tokio::test]
async fn test_stale_timeout_is_ignored() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    let stale = TimerExpired {
        question_id: "Group Stage-0".to_string(),
        ticket: 999,
    };
    assert_eq!(c.on_timeout(stale).await.expect("handled"), None);
    assert_eq!(c.status(), Status::Answering);

    c.submit_answer(Some("right".to_string()), false)
        .await
        .expect("accepted");
    let after_answer = TimerExpired {
        question_id: "Group Stage-0".to_string(),
        ticket: 1,
    };
    assert_eq!(c.on_timeout(after_answer).await.expect("handled"), None);
    assert_eq!(c.session().map(|s| s.stage_score()), Some(1));
}

// ─────────────────────────────────────────────────────────────
//  Progression
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_strong_group_goes_to_round_of_16() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 8, 8]).await;

    let view = c.view();
    assert_eq!(view.stage, Some(Stage::RoundOf16));
    assert_eq!(view.total_score, 32);
    assert_eq!(view.group_stage_total_points, 0);
    assert_eq!(view.question_number, Some(1));

    let stages: Vec<Stage> = supply.requests().iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::GroupStage,
            Stage::GroupStage,
            Stage::GroupStage,
            Stage::GroupStage,
            Stage::RoundOf16,
        ]
    );
}

#[tokio::test]
async fn test_group_tie_goes_to_extra_time_and_win_advances() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 8, 1]).await;

    let view = c.view();
    assert!(view.in_extra_time);
    assert_eq!(view.status, Status::Answering);
    assert_eq!(view.stage_score, 0);
    assert_eq!(view.question.as_ref().map(|q| q.id.as_str()), Some("et-5"));
    assert!(view.remaining_secs.is_some_and(|s| s <= 45));
    assert!(supply.requests()[4].difficulty.is_some());

    let feedback = c
        .submit_answer(Some("right".to_string()), false)
        .await
        .expect("extra time resolves");
    assert_eq!(feedback, Some(Feedback::Correct));

    let view = c.view();
    assert!(!view.in_extra_time);
    assert_eq!(view.stage, Some(Stage::RoundOf16));
    assert_eq!(view.total_score, 25);
    assert_eq!(supply.requests()[5].stage, Stage::RoundOf16);
}

#[tokio::test]
async fn test_extra_time_miss_ends_game_without_fetch() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 2, 0]).await;
    assert!(c.view().in_extra_time);

    c.submit_answer(Some("wrong".to_string()), false)
        .await
        .expect("extra time resolves");

    assert_eq!(c.status(), Status::Finished(Outcome::Lost));
    assert!(c.message().is_some_and(|m| m.contains("extra time")));
    assert_eq!(supply.requests().len(), 5);

    let after = c
        .submit_answer(Some("right".to_string()), false)
        .await
        .expect("ignored");
    assert_eq!(after, None);
    assert_eq!(supply.requests().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_extra_time_timeout_ends_game_without_fetch() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, mut rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 2, 0]).await;
    assert!(c.view().in_extra_time);

    let opened = tokio::time::Instant::now();
    let expired = rx.recv().await.expect("extra time countdown fires");
    let waited = opened.elapsed();
    assert!(waited >= Duration::from_secs(45) && waited < Duration::from_secs(46));

    let feedback = c.on_timeout(expired).await.expect("timeout handled");

    assert_eq!(feedback, Some(Feedback::NoAnswer));
    assert_eq!(c.status(), Status::Finished(Outcome::Lost));
    assert!(c.message().is_some_and(|m| m.contains("extra time")));
    assert_eq!(c.view().remaining_secs, None);
    assert_eq!(supply.requests().len(), 5);
}

#[tokio::test]
async fn test_weak_knockout_loses_with_summary() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 8, 8]).await;
    play_batch(&mut c, 2).await;

    assert_eq!(c.status(), Status::Finished(Outcome::Lost));
    assert_eq!(
        c.message(),
        Some("You didn't pass the Round of 16. You needed 4 correct answers, but only got 2. Game Over.")
    );
    assert_eq!(c.view().remaining_secs, None);
}

#[tokio::test]
async fn test_perfect_run_wins_tournament() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;

    play_group(&mut c, [8, 8, 8, 8]).await;
    for _ in 0..4 {
        play_batch(&mut c, BATCH_SIZE).await;
    }

    assert_eq!(c.status(), Status::Finished(Outcome::Won));
    assert_eq!(c.message(), Some("You have won the FIQScore Tournament!"));
    assert_eq!(c.view().total_score, 64);
    assert_eq!(supply.requests().len(), 8);
}

// ─────────────────────────────────────────────────────────────
//  Supply failures
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_batch_freezes_without_mutation() {
    let supply = Arc::new(ScriptedSupply::with(&[(2, Scripted::Empty)]));
    let (mut c, _rx) = started(&supply).await;

    for i in 0..BATCH_SIZE - 1 {
        answer(&mut c, i < 5).await;
    }
    c.submit_answer(Some("right".to_string()), false)
        .await
        .expect("last answer accepted");
    let err = c
        .continue_after_feedback()
        .await
        .expect_err("empty batch fails");

    assert!(matches!(
        err,
        ControllerError::Supply(SupplyError {
            kind: SupplyErrorKind::Empty,
            ..
        })
    ));
    assert_eq!(c.status(), Status::Failed);
    assert_eq!(
        c.message(),
        Some("No questions found for this selection. Try a different tournament or stage.")
    );

    let session = c.session().expect("previous session kept");
    assert_eq!(session.group_stage_matches_played(), 0);
    assert_eq!(session.group_stage_total_points(), 6);

    assert_eq!(
        c.submit_answer(Some("right".to_string()), false)
            .await
            .expect("ignored"),
        None
    );
    assert_eq!(supply.requests().len(), 2);
}

#[tokio::test]
async fn test_failed_first_fetch_reports_message() {
    let supply = Arc::new(ScriptedSupply::with(&[(1, Scripted::Error)]));
    let (mut c, _rx) = controller(&supply);

    let err = c
        .start_session(&SelectionForm::single("Premier League"))
        .await
        .expect_err("fetch fails");

    assert!(matches!(err, ControllerError::Supply(_)));
    assert_eq!(c.status(), Status::Failed);
    assert_eq!(
        c.message(),
        Some("Failed to load questions: HTTP error! status: 500.")
    );
    assert!(c.current_question().is_none());
}

#[tokio::test]
async fn test_malformed_question_is_rejected() {
    let supply = Arc::new(ScriptedSupply::with(&[(1, Scripted::Malformed)]));
    let (mut c, _rx) = controller(&supply);

    let err = c
        .start_session(&SelectionForm::single("FIFA World Cup"))
        .await
        .expect_err("bad question");

    assert!(matches!(
        err,
        ControllerError::Supply(SupplyError {
            kind: SupplyErrorKind::Malformed,
            ..
        })
    ));
    assert_eq!(c.status(), Status::Failed);
}

#[tokio::test]
async fn test_oversized_batch_is_rejected() {
    let supply = Arc::new(ScriptedSupply::with(&[(1, Scripted::Oversized)]));
    let (mut c, _rx) = controller(&supply);

    let err = c
        .start_session(&SelectionForm::single("FIFA World Cup"))
        .await
        .expect_err("nine questions in a batch");

    assert!(matches!(
        err,
        ControllerError::Supply(SupplyError {
            kind: SupplyErrorKind::Malformed,
            ..
        })
    ));
    assert_eq!(c.status(), Status::Failed);
    assert!(c.current_question().is_none());
    assert_eq!(
        c.submit_answer(Some("right".to_string()), false)
            .await
            .expect("ignored"),
        None
    );
}

// ─────────────────────────────────────────────────────────────
//  Reset
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_play_again_clears_everything() {
    let supply = Arc::new(ScriptedSupply::default());
    let (mut c, _rx) = started(&supply).await;
    answer(&mut c, true).await;

    c.play_again();

    let view = c.view();
    assert_eq!(view.status, Status::Idle);
    assert_eq!(view.selection, None);
    assert_eq!(view.question, None);
    assert_eq!(view.total_score, 0);
    assert_eq!(view.remaining_secs, None);
    assert!(c.current_question().is_none());

    c.start_session(&SelectionForm::single("Premier League"))
        .await
        .expect("restart");
    assert_eq!(c.view().status, Status::Answering);
}
