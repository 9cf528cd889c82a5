//! Question supply backed by a remote HTTP endpoint.

use super::{QuestionRequest, QuestionSupply};
use crate::error::{SupplyError, SupplyErrorKind};
use crate::question::Question;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Error body returned by the endpoint on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Fetches questions with `GET <base_url>?stage=..`.
#[derive(Debug, Clone)]
pub struct HttpQuestionSupply {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQuestionSupply {
    /// Creates a supply for the given endpoint.
    #[instrument]
    pub fn new(base_url: impl Into<String> + std::fmt::Debug) -> Self {
        let base_url = base_url.into();
        info!(%base_url, "Using HTTP question supply");
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Full request URL, query string included.
    pub fn url_for(&self, request: &QuestionRequest) -> Result<reqwest::Url, SupplyError> {
        reqwest::Url::parse_with_params(&self.base_url, request.query_pairs()).map_err(|e| {
            SupplyError::new(
                SupplyErrorKind::Transport,
                format!("invalid supply url {}: {}", self.base_url, e),
            )
        })
    }
}

#[async_trait]
impl QuestionSupply for HttpQuestionSupply {
    #[instrument(skip(self, request), fields(stage = %request.stage, difficulty = ?request.difficulty))]
    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<Question>, SupplyError> {
        let url = self.url_for(request)?;
        debug!(%url, "Fetching questions");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "Question request failed");
            return Err(SupplyError::new(SupplyErrorKind::Status, message));
        }

        let body = response.text().await?;
        let questions: Vec<Question> = serde_json::from_str(&body).map_err(|e| {
            SupplyError::new(
                SupplyErrorKind::Malformed,
                format!("unreadable question payload: {}", e),
            )
        })?;

        debug!(count = questions.len(), "Questions received");
        Ok(questions)
    }
}
