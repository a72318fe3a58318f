//! Typed errors at the library seams.
//!
//! None of these are meant to reach the user as a crash: planner errors are
//! absorbed by the keyword fallback, unit errors become failed steps.

use std::time::Duration;

use thiserror::Error;

/// Why the planner couldn't produce a plan.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("no LLM API key configured")]
    MissingApiKey,

    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("LLM call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("failed to parse LLM response as JSON: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("unexpected LLM response shape: {0}")]
    UnexpectedShape(String),
}

/// Why a single unit invocation failed.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unit i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("exit code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("unit produced invalid UTF-8 output")]
    InvalidUtf8,

    #[error("no runner registered for unit '{0}'")]
    NotRegistered(String),

    #[error("failed to encode unit output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Requests the orchestrator refuses before doing any work.
#[derive(Debug, Error, PartialEq)]
pub enum OrchestratorError {
    #[error("a request is required")]
    MissingRequest,

    #[error("no input text provided")]
    MissingInput,
}
