//! Ties the decision engine and the executor together for one request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::consts::{LOGGED_REQUEST_CHARS, SAMPLE_CHARS, head};
use crate::decider::DecisionEngine;
use crate::error::OrchestratorError;
use crate::pipeline::{Executor, StepResult};
use crate::units::{Catalog, UnitName, UnitParams};

static SUMMARY_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"summarize\s+.*?\s+to\s+(\d+)\s+sentences").unwrap());

/// Knobs for one request, read from its wording and/or set by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentences: Option<usize>,
    #[serde(default)]
    pub parallel: bool,
}

impl Params {
    /// `self` wins wherever it says something; `extracted` fills the gaps.
    pub fn over(self, extracted: Params) -> Params {
        Params {
            sentences: self.sentences.or(extracted.sentences),
            parallel: self.parallel || extracted.parallel,
        }
    }

    pub fn unit_params(&self) -> UnitParams {
        UnitParams {
            sentences: self.sentences,
        }
    }
}

/// Pull parameters out of the request wording.
///
/// "summarize ... to N sentences" sets the summary length; the words
/// "parallel" or "concurrently" ask for parallel execution.
pub fn extract_params(request: &str) -> Params {
    let lowered = request.to_lowercase();

    let sentences = SUMMARY_LENGTH
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|&n| n > 0);

    let parallel = lowered.contains("parallel") || lowered.contains("concurrently");

    Params {
        sentences,
        parallel,
    }
}

/// What one processed request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub request: String,
    pub execution_plan: Vec<UnitName>,
    /// Whether the units actually ran in parallel.
    pub parallel: bool,
    pub parameters: Params,
    /// Wall time of the pipeline run, in seconds.
    pub execution_time: f64,
    pub results: Vec<StepResult>,
    pub output: String,
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(StepResult::is_success)
    }
}

pub struct Orchestrator {
    decider: DecisionEngine,
    executor: Executor,
}

impl Orchestrator {
    pub fn new(decider: DecisionEngine, executor: Executor) -> Self {
        Self { decider, executor }
    }

    /// Standard catalog, planner and runner chosen by `settings`.
    pub fn from_settings(settings: &Settings) -> io::Result<Self> {
        let catalog = Arc::new(Catalog::standard());
        let decider =
            DecisionEngine::new(catalog, settings.planner()).with_timeout(settings.llm.timeout);
        let registry = Arc::new(settings.registry()?);
        tracing::debug!("unit registry: {:?}", registry);
        Ok(Self::new(
            decider,
            Executor::new(registry, settings.unit_timeout),
        ))
    }

    pub fn decider(&self) -> &DecisionEngine {
        &self.decider
    }

    /// Plan and run `request` over `text`.
    ///
    /// Explicit `overrides` take precedence over what the request wording
    /// implies. Unit failures are reported inside the `Execution`, only
    /// empty input is an error.
    pub async fn process(
        &self,
        request: &str,
        text: &str,
        overrides: Params,
    ) -> Result<Execution, OrchestratorError> {
        if request.trim().is_empty() {
            return Err(OrchestratorError::MissingRequest);
        }
        if text.is_empty() {
            tracing::error!("no input text provided");
            return Err(OrchestratorError::MissingInput);
        }

        tracing::info!(
            "processing request: '{}...'",
            head(request, LOGGED_REQUEST_CHARS)
        );
        let params = overrides.over(extract_params(request));

        let plan = self
            .decider
            .determine_units(request, Some(head(text, SAMPLE_CHARS)))
            .await;
        tracing::info!(
            "execution plan: {}",
            plan.iter().map(|u| u.as_str()).collect::<Vec<_>>().join(" -> ")
        );

        let started = Instant::now();
        let run = self
            .executor
            .run(&plan, text, &params.unit_params(), params.parallel)
            .await;
        let execution_time = started.elapsed().as_secs_f64();

        Ok(Execution {
            request: request.to_string(),
            execution_plan: plan,
            parallel: run.mode.is_parallel(),
            parameters: params,
            execution_time,
            results: run.results,
            output: run.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::RunnerKind;
    use crate::units::UnitRegistry;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            DecisionEngine::keyword_only(Arc::new(Catalog::standard())),
            Executor::new(Arc::new(UnitRegistry::in_process()), Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn from_settings_without_key_uses_keywords() {
        let settings = Settings {
            runner: RunnerKind::InProcess,
            ..Settings::default()
        };
        let orchestrator = Orchestrator::from_settings(&settings).unwrap();
        assert!(!orchestrator.decider().uses_planner());

        let execution = orchestrator
            .process("Summarize this article", "One. Two.", Params::default())
            .await
            .unwrap();
        assert_eq!(execution.output, "One.\n\nTwo.");
    }

    #[test]
    fn extracts_summary_length() {
        let params = extract_params("Summarize this article to 2 sentences");
        assert_eq!(params.sentences, Some(2));
        assert!(!params.parallel);
    }

    #[test]
    fn summary_length_needs_the_full_phrase() {
        assert_eq!(extract_params("summarize to 2 sentences").sentences, None);
        assert_eq!(extract_params("give me 2 sentences").sentences, None);
        assert_eq!(extract_params("summarize it to 0 sentences").sentences, None);
    }

    #[test]
    fn extracts_parallel_flag() {
        assert!(extract_params("Clean and analyze in PARALLEL").parallel);
        assert!(extract_params("run these concurrently").parallel);
        assert!(!extract_params("clean it").parallel);
    }

    #[test]
    fn overrides_win() {
        let extracted = Params {
            sentences: Some(5),
            parallel: false,
        };
        let explicit = Params {
            sentences: Some(1),
            parallel: true,
        };
        assert_eq!(explicit.over(extracted), explicit);
        assert_eq!(Params::default().over(extracted), extracted);
    }

    #[test]
    fn params_wire_form() {
        let value = serde_json::to_value(Params::default()).unwrap();
        assert_eq!(value, serde_json::json!({"parallel": false}));
        let parsed: Params = serde_json::from_str(r#"{"sentences": 4}"#).unwrap();
        assert_eq!(parsed.sentences, Some(4));
        assert!(!parsed.parallel);
    }

    #[tokio::test]
    async fn rejects_empty_request() {
        let err = orchestrator()
            .process("   ", "text", Params::default())
            .await
            .unwrap_err();
        assert_eq!(err, OrchestratorError::MissingRequest);
    }

    #[tokio::test]
    async fn rejects_empty_text() {
        let err = orchestrator()
            .process("clean it", "", Params::default())
            .await
            .unwrap_err();
        assert_eq!(err, OrchestratorError::MissingInput);
    }

    #[tokio::test]
    async fn clean_then_sentiment() {
        let execution = orchestrator()
            .process(
                "Clean this text and analyze sentiment",
                "This is AMAZING! I love this product so much!!!",
                Params::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            execution.execution_plan,
            vec![UnitName::DataCleaning, UnitName::SentimentAnalysis]
        );
        assert!(!execution.parallel);
        assert!(execution.succeeded());
        assert_eq!(
            execution.results[0].output(),
            Some("this is amazing i love this product so much")
        );
        let report: serde_json::Value = serde_json::from_str(&execution.output).unwrap();
        assert_eq!(report["classification"], "positive");
    }

    #[tokio::test]
    async fn parallel_request_runs_in_parallel() {
        let execution = orchestrator()
            .process(
                "Clean and analyze sentiment in parallel",
                "Good stuff, great stuff!",
                Params::default(),
            )
            .await
            .unwrap();
        assert!(execution.parallel);
        assert!(execution.parameters.parallel);
        // Both units saw the raw input.
        assert_eq!(
            execution.results[0].output(),
            Some("good stuff great stuff")
        );
        assert_eq!(execution.output, execution.results[1].output().unwrap());
    }

    #[tokio::test]
    async fn single_unit_ignores_parallel() {
        let execution = orchestrator()
            .process(
                "Summarize this",
                "One. Two.",
                Params {
                    sentences: None,
                    parallel: true,
                },
            )
            .await
            .unwrap();
        assert!(!execution.parallel);
        assert!(execution.parameters.parallel);
    }

    #[tokio::test]
    async fn execution_serializes_like_the_api() {
        let execution = orchestrator()
            .process("do the thing", "Hello, World!", Params::default())
            .await
            .unwrap();
        let value = serde_json::to_value(&execution).unwrap();
        assert_eq!(value["request"], "do the thing");
        assert_eq!(value["execution_plan"], serde_json::json!(["data-cleaning"]));
        assert_eq!(value["parallel"], false);
        assert_eq!(value["results"][0]["status"], "success");
        assert_eq!(value["results"][0]["output_preview"], "hello world");
        assert_eq!(value["output"], "hello world");
        assert!(value["execution_time"].as_f64().unwrap() >= 0.0);
    }
}
