//! JSON-over-HTTP front end.

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::OrchestratorError;
use crate::orchestrator::{Execution, Orchestrator, Params};

const MISSING_FIELDS: &str = "Request and input text are required";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    pub request: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub parallel: bool,
    pub sentences: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("server terminated with error")
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn process(
    State(state): State<AppState>,
    Json(payload): Json<ProcessRequest>,
) -> Result<Json<Execution>, ApiError> {
    let request = payload.request.unwrap_or_default();
    let text = payload.text.unwrap_or_default();
    if request.trim().is_empty() || text.is_empty() {
        return Err(bad_request(MISSING_FIELDS));
    }

    let overrides = Params {
        sentences: payload.sentences.filter(|&n| n > 0),
        parallel: payload.parallel,
    };

    state
        .orchestrator
        .process(&request, &text, overrides)
        .await
        .map(Json)
        .map_err(map_orchestrator_error)
}

fn map_orchestrator_error(err: OrchestratorError) -> ApiError {
    match err {
        OrchestratorError::MissingRequest | OrchestratorError::MissingInput => {
            bad_request(MISSING_FIELDS)
        }
    }
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}
