//! Questions as served by the question supply.

use serde::{Deserialize, Serialize};

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier. Not guaranteed unique across batches.
    pub id: String,
    /// Prompt shown to the player.
    pub question: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// The option that scores.
    pub correct_answer: String,
    /// Difficulty or fallback tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Question {
    /// Returns true if `answer` is the designated correct option.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    /// Checks that the question can be played.
    pub fn validate(&self) -> Result<(), String> {
        if self.options.is_empty() {
            return Err(format!("question {} has no options", self.id));
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(format!(
                "question {} has a correct answer that is not among its options",
                self.id
            ));
        }
        Ok(())
    }
}

/// Questions for one batch plus a cursor.
///
/// Replaced wholesale on every fetch; only the cursor moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBatch {
    questions: Vec<Question>,
    cursor: usize,
}

impl QuestionBatch {
    /// Wraps a non-empty list of questions.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            None
        } else {
            Some(Self {
                questions,
                cursor: 0,
            })
        }
    }

    /// Question under the cursor.
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    /// True while another question follows the current one.
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.questions.len()
    }

    /// Moves to the next question. Returns false when the batch is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.has_next() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Zero-based cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of questions in the batch.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed batch.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
