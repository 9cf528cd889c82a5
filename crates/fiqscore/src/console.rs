//! Plain terminal driver for a [`SessionController`].

use anyhow::Result;
use fiqscore::{
    ControllerError, Feedback, QuestionSupply, SelectionForm, SessionController, SessionView,
    Status, TimerExpired,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, instrument, warn};

/// Runs games until the player declines another one or stdin closes.
#[instrument(skip_all)]
pub async fn run<S: QuestionSupply>(
    mut controller: SessionController<S>,
    mut expiries: UnboundedReceiver<TimerExpired>,
    form: SelectionForm,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("\n\"{}\"\n", controller.view().challenge);
        if let Err(e) = controller.start_session(&form).await {
            println!("{}", describe(&e));
            return Ok(());
        }

        play(&mut controller, &mut expiries, &mut lines).await?;

        println!("Play again? [y/N]");
        match lines.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                controller.play_again();
            }
            _ => return Ok(()),
        }
    }
}

async fn play<S: QuestionSupply>(
    controller: &mut SessionController<S>,
    expiries: &mut UnboundedReceiver<TimerExpired>,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    loop {
        let view = controller.view();
        match view.status {
            Status::Finished(outcome) => {
                println!("\n{:?}: {}", outcome, view.message.unwrap_or_default());
                println!("Total correct answers: {}", view.total_score);
                return Ok(());
            }
            Status::Failed => {
                println!("\n{}", view.message.unwrap_or_default());
                return Ok(());
            }
            Status::Idle | Status::Loading | Status::ShowingFeedback => {
                controller.continue_after_feedback().await.or_else(keep_going)?;
                if controller.status() == view.status {
                    warn!(status = ?view.status, "Controller made no progress");
                    return Ok(());
                }
                continue;
            }
            Status::Answering => render(&view),
        }

        let result = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                let pick = parse_pick(&line, view.question.as_ref().map_or(0, |q| q.options.len()))
                    .and_then(|i| view.question.as_ref().map(|q| q.options[i].clone()));
                if let Some(option) = &pick {
                    controller.select_option(option);
                }
                controller.submit_answer(pick, false).await
            }
            Some(expired) = expiries.recv() => {
                debug!(question_id = %expired.question_id, "Countdown expired");
                controller.on_timeout(expired).await
            }
        };

        match result {
            Ok(Some(feedback)) => println!("{}", feedback_line(feedback)),
            Ok(None) => {}
            Err(e) => println!("{}", describe(&e)),
        }
        controller.continue_after_feedback().await.or_else(keep_going)?;
    }
}

fn keep_going(e: ControllerError) -> Result<()> {
    println!("{}", describe(&e));
    Ok(())
}

fn render(view: &SessionView) {
    let Some(question) = &view.question else {
        return;
    };
    let stage = view.stage.map(|s| s.name()).unwrap_or_default();
    if view.in_extra_time {
        println!("\n== {} | EXTRA TIME ==", stage);
    } else {
        println!(
            "\n== {} | Question {}/{} | Stage score {} | Total {} ==",
            stage,
            view.question_number.unwrap_or(0),
            view.batch_len.unwrap_or(0),
            view.stage_score,
            view.total_score
        );
    }
    if let Some(secs) = view.remaining_secs {
        println!("Time left: {}s", secs);
    }
    println!("{}", question.question);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }
    println!("Your answer (number, blank to pass):");
}

fn parse_pick(line: &str, options: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=options).contains(&n).then(|| n - 1)
}

fn feedback_line(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Correct => "Correct!",
        Feedback::Incorrect => "Wrong answer.",
        Feedback::NoAnswer => "No answer.",
    }
}

fn describe(e: &ControllerError) -> String {
    match e {
        ControllerError::Supply(s) => s.user_message(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick_bounds() {
        assert_eq!(parse_pick("1", 4), Some(0));
        assert_eq!(parse_pick(" 4 ", 4), Some(3));
        assert_eq!(parse_pick("5", 4), None);
        assert_eq!(parse_pick("0", 4), None);
        assert_eq!(parse_pick("", 4), None);
    }
}
