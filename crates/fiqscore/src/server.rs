//! Reference question endpoint served from a [`QuestionBank`].

use crate::supply::QuestionBank;
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use fiqscore_rules::Difficulty;
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, instrument, warn};

/// Path served by the standalone endpoint.
pub const QUESTIONS_PATH: &str = "/questions";

/// Path of the serverless function the web client calls.
pub const NETLIFY_PATH: &str = "/.netlify/functions/getQuestions";

/// Query string accepted by the endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionQuery {
    /// Stage name; required.
    pub stage: Option<String>,
    /// Single tournament.
    pub tournament: Option<String>,
    /// First tournament of a mix.
    pub tournament1: Option<String>,
    /// Second tournament of a mix.
    pub tournament2: Option<String>,
    /// `normal` or `hard` for an extra-time question.
    pub difficulty: Option<String>,
}

/// Builds the router for both question paths.
///
/// Any origin may call it; preflight requests are answered by the CORS layer.
pub fn router(bank: Arc<QuestionBank>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(QUESTIONS_PATH, get(get_questions))
        .route(NETLIFY_PATH, get(get_questions))
        .layer(
            ServiceBuilder::new()
                .map_request(|req: Request<Body>| {
                    info!(
                        method = %req.method(),
                        uri = %req.uri(),
                        "Incoming HTTP request"
                    );
                    req
                })
                .layer(cors),
        )
        .with_state(bank)
}

/// Binds and serves the endpoint until the process stops.
#[instrument(skip(bank), fields(questions = bank.len()))]
pub async fn serve(host: &str, port: u16, bank: QuestionBank) -> anyhow::Result<()> {
    let app = router(Arc::new(bank));
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Question endpoint ready at http://{}:{}{}", host, port, QUESTIONS_PATH);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_questions(
    State(bank): State<Arc<QuestionBank>>,
    Query(query): Query<QuestionQuery>,
) -> Response {
    let Some(stage) = query.stage.as_deref().filter(|s| !s.is_empty()) else {
        warn!(?query, "Question request without stage");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": "Missing required query parameter: stage" })),
        )
            .into_response();
    };

    let difficulty = match query.difficulty.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<Difficulty>() {
            Ok(difficulty) => Some(difficulty),
            Err(_) => {
                warn!(difficulty = raw, "Unknown difficulty, serving a regular batch");
                None
            }
        },
    };

    debug!(
        stage,
        tournament = ?query.tournament,
        tournament1 = ?query.tournament1,
        tournament2 = ?query.tournament2,
        ?difficulty,
        "Serving questions"
    );

    let questions = {
        let mut rng = rand::thread_rng();
        bank.draw(difficulty, &mut rng)
    };

    (StatusCode::OK, Json(questions)).into_response()
}
