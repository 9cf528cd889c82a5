//! Where questions come from.
//!
//! The controller only sees [`QuestionSupply`]. [`HttpQuestionSupply`] talks
//! to a remote endpoint; [`QuestionBank`] answers in-process from built-in
//! or file-loaded pools and also backs the reference HTTP endpoint.

mod bank;
mod http;

pub use bank::QuestionBank;
pub use http::HttpQuestionSupply;

use crate::error::SupplyError;
use crate::question::Question;
use crate::selection::TournamentSelection;
use async_trait::async_trait;
use fiqscore_rules::{Difficulty, Stage};
use std::sync::Arc;

/// One fetch: a stage, the tournaments and, for extra time, a difficulty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    /// Stage the questions are for.
    pub stage: Stage,
    /// Tournament data set(s).
    pub tournaments: TournamentSelection,
    /// Set only for extra-time requests.
    pub difficulty: Option<Difficulty>,
}

impl QuestionRequest {
    /// Request for a regular batch.
    pub fn batch(stage: Stage, tournaments: TournamentSelection) -> Self {
        Self {
            stage,
            tournaments,
            difficulty: None,
        }
    }

    /// Request for a single extra-time question.
    pub fn extra_time(stage: Stage, tournaments: TournamentSelection, difficulty: Difficulty) -> Self {
        Self {
            stage,
            tournaments,
            difficulty: Some(difficulty),
        }
    }

    /// Query parameters in the order the endpoint expects them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("stage", self.stage.name().to_string())];
        match &self.tournaments {
            TournamentSelection::Single(name) => pairs.push(("tournament", name.clone())),
            TournamentSelection::Mix(a, b) => {
                pairs.push(("tournament1", a.clone()));
                pairs.push(("tournament2", b.clone()));
            }
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.as_str().to_string()));
        }
        pairs
    }
}

/// Source of questions for the session controller.
#[async_trait]
pub trait QuestionSupply: Send + Sync {
    /// Fetches questions for a request.
    ///
    /// An `Ok` result may still be empty; the caller decides whether that
    /// is an error.
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError>;
}

#[async_trait]
impl<T: QuestionSupply + ?Sized> QuestionSupply for Arc<T> {
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<T: QuestionSupply + ?Sized> QuestionSupply for Box<T> {
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError> {
        (**self).fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_query() {
        let req = QuestionRequest::batch(
            Stage::GroupStage,
            TournamentSelection::Single("FIFA World Cup".to_string()),
        );
        assert_eq!(
            req.query_pairs(),
            vec![
                ("stage", "Group Stage".to_string()),
                ("tournament", "FIFA World Cup".to_string()),
            ]
        );
    }

    #[test]
    fn test_mix_extra_time_query() {
        let req = QuestionRequest::extra_time(
            Stage::Final,
            TournamentSelection::Mix("FIFA World Cup".to_string(), "Premier League".to_string()),
            Difficulty::Hard,
        );
        assert_eq!(
            req.query_pairs(),
            vec![
                ("stage", "The Final".to_string()),
                ("tournament1", "FIFA World Cup".to_string()),
                ("tournament2", "Premier League".to_string()),
                ("difficulty", "hard".to_string()),
            ]
        );
    }
}
