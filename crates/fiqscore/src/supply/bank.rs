//! In-process question pools.

use super::{QuestionRequest, QuestionSupply};
use crate::error::{SupplyError, SupplyErrorKind};
use crate::question::Question;
use async_trait::async_trait;
use fiqscore_rules::{BATCH_SIZE, Difficulty};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

const OFFSIDE_ANSWER: &str = "A player is nearer to the opponents' goal line than both the ball and the second-last opponent.";

/// Question pools split by difficulty.
///
/// A regular draw mixes all pools; an extra-time draw takes one question
/// from the requested pool. Draws are never empty: short pools are padded
/// with filler questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    easy: Vec<Question>,
    #[serde(default)]
    normal: Vec<Question>,
    #[serde(default)]
    hard: Vec<Question>,
}

impl QuestionBank {
    /// Creates a bank from explicit pools.
    pub fn new(easy: Vec<Question>, normal: Vec<Question>, hard: Vec<Question>) -> Self {
        Self { easy, normal, hard }
    }

    /// The built-in sample pools.
    pub fn builtin() -> Self {
        Self {
            easy: vec![
                q("easy-q-1", "easy", "Which country won the FIFA World Cup in 2014?", &["Brazil", "Germany", "Argentina", "Spain"], "Germany"),
                q("easy-q-2", "easy", "How many players are on a standard football team on the pitch?", &["9", "10", "11", "12"], "11"),
                q("easy-q-3", "easy", "What is the primary color of Real Madrid's home kit?", &["Blue", "Red", "White", "Black"], "White"),
                q("easy-q-4", "easy", "Which of these is NOT a position in football?", &["Goalkeeper", "Midfielder", "Pitcher", "Defender"], "Pitcher"),
            ],
            normal: vec![
                q("normal-q-1", "normal", "Which player has won the most Ballon d'Or awards?", &["Cristiano Ronaldo", "Lionel Messi", "Michel Platini", "Johan Cruyff"], "Lionel Messi"),
                q("normal-q-2", "normal", "In which year did the Premier League officially begin?", &["1988", "1990", "1992", "1994"], "1992"),
                q("normal-q-3", "normal", "Which club holds the record for the most UEFA Champions League titles?", &["FC Barcelona", "Bayern Munich", "AC Milan", "Real Madrid"], "Real Madrid"),
                q("normal-q-4", "normal", "What is the maximum number of substitutions allowed in a standard football match?", &["2", "3", "4", "5"], "5"),
            ],
            hard: vec![
                q("hard-q-1", "hard", "Which country hosted the first ever FIFA World Cup in 1930?", &["Brazil", "Italy", "Uruguay", "France"], "Uruguay"),
                q("hard-q-2", "hard", "Name the only player to have scored in three different FIFA World Cup finals.", &["Pelé", "Gerd Müller", "Vavá", "Zinedine Zidane"], "Pelé"),
                q("hard-q-3", "hard", "Which manager has won the Premier League title with two different clubs?", &["Arsène Wenger", "Sir Alex Ferguson", "José Mourinho", "Pep Guardiola"], "José Mourinho"),
                q("hard-q-4", "hard", "The 'Panenka' penalty kick is named after a player from which country?", &["Germany", "Czechoslovakia", "Brazil", "Italy"], "Czechoslovakia"),
            ],
        }
    }

    /// Loads pools from a JSON file shaped `{ "easy": [..], "normal": [..], "hard": [..] }`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SupplyError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SupplyError::new(
                SupplyErrorKind::Transport,
                format!("Failed to read question bank: {}", e),
            )
        })?;
        let bank: Self = serde_json::from_str(&content).map_err(|e| {
            SupplyError::new(
                SupplyErrorKind::Malformed,
                format!("Failed to parse question bank: {}", e),
            )
        })?;

        if let Some(bad) = bank.all().find_map(|q| q.validate().err()) {
            return Err(SupplyError::new(SupplyErrorKind::Malformed, bad));
        }

        info!(
            easy = bank.easy.len(),
            normal = bank.normal.len(),
            hard = bank.hard.len(),
            "Question bank loaded"
        );
        Ok(bank)
    }

    /// Total number of pooled questions.
    pub fn len(&self) -> usize {
        self.easy.len() + self.normal.len() + self.hard.len()
    }

    /// True when every pool is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn all(&self) -> impl Iterator<Item = &Question> {
        self.easy.iter().chain(&self.normal).chain(&self.hard)
    }

    /// Draws questions: one of `difficulty` when given, else a shuffled batch.
    #[instrument(skip(self, rng))]
    pub fn draw<R: Rng + ?Sized>(&self, difficulty: Option<Difficulty>, rng: &mut R) -> Vec<Question> {
        let mut drawn = match difficulty {
            Some(difficulty) => self.draw_extra_time(difficulty, rng),
            None => self.draw_batch(rng),
        };

        if drawn.is_empty() {
            error!("Draw produced no questions, adding emergency question");
            drawn.push(q(
                "emergency-fallback-q",
                "emergency_fallback",
                "Emergency Fallback: What is 1 + 1?",
                &["1", "2", "3", "4"],
                "2",
            ));
        }

        debug!(count = drawn.len(), first = %drawn[0].id, "Questions drawn");
        drawn
    }

    fn draw_extra_time<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Vec<Question> {
        let pool = match difficulty {
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        };

        match pool.choose(rng) {
            Some(question) => vec![question.clone()],
            None => {
                warn!(%difficulty, "Empty pool, using extra-time filler");
                vec![match difficulty {
                    Difficulty::Normal => q(
                        "fallback-q-normal-extratime",
                        "fallback_normal",
                        "Extra Time (Normal): What is 5 + 5?",
                        &["8", "9", "10", "11"],
                        "10",
                    ),
                    Difficulty::Hard => q(
                        "fallback-q-hard-extratime",
                        "fallback_hard",
                        "Extra Time (Hard): What year did WWII end?",
                        &["1942", "1945", "1950", "1939"],
                        "1945",
                    ),
                }]
            }
        }
    }

    fn draw_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question> {
        let mut all: Vec<Question> = self.all().cloned().collect();
        all.shuffle(rng);
        all.truncate(BATCH_SIZE);

        while all.len() < BATCH_SIZE {
            warn!(count = all.len(), "Not enough questions for a batch, padding");
            let suffix: String = (0..5).map(|_| rng.sample(Alphanumeric) as char).collect();
            all.push(q(
                &format!("fallback-std-{}-{}", all.len(), suffix.to_lowercase()),
                "fallback_standard",
                &format!("Fallback Question {}: What is offside in football?", all.len() + 1),
                &[
                    OFFSIDE_ANSWER,
                    "When a player stands behind the goalkeeper.",
                    "When a player runs faster than the ball.",
                ],
                OFFSIDE_ANSWER,
            ));
        }
        all
    }
}

#[async_trait]
impl QuestionSupply for QuestionBank {
    #[instrument(skip(self, request), fields(stage = %request.stage, tournaments = %request.tournaments))]
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError> {
        let questions = {
            let mut rng = rand::thread_rng();
            self.draw(request.difficulty, &mut rng)
        };
        Ok(questions)
    }
}

fn q(id: &str, kind: &str, question: &str, options: &[&str], correct: &str) -> Question {
    Question {
        id: id.to_string(),
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
        kind: Some(kind.to_string()),
    }
}
