//! Turns a natural-language request into an ordered plan of unit names.
//!
//! An LLM planner is consulted first when one is configured. Whatever it
//! returns is validated against the catalog; an empty result or any planner
//! error falls back to keyword matching, so `determine_units` never fails.

pub mod keywords;
pub mod llm;
pub mod mock;
pub mod parse;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::consts::{LOGGED_REQUEST_CHARS, PLANNER_TIMEOUT, head};
use crate::error::DecisionError;
use crate::prompts::plan::{build_plan_system_prompt, build_plan_user_message};
use crate::units::{Catalog, UnitName};

/// The two messages sent to a planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPrompt {
    pub system: String,
    pub user: String,
}

impl PlanPrompt {
    pub fn new(catalog: &Catalog, request: &str, sample: Option<&str>) -> Self {
        Self {
            system: build_plan_system_prompt(catalog),
            user: build_plan_user_message(request, sample),
        }
    }
}

/// Something that can propose a plan. Returns the raw reply text.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Short name for logs, usually the model.
    fn label(&self) -> &str;

    async fn propose(&self, prompt: &PlanPrompt) -> Result<String, DecisionError>;
}

#[async_trait]
impl<P: Planner + ?Sized> Planner for Arc<P> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn propose(&self, prompt: &PlanPrompt) -> Result<String, DecisionError> {
        (**self).propose(prompt).await
    }
}

pub struct DecisionEngine {
    catalog: Arc<Catalog>,
    planner: Option<Box<dyn Planner>>,
    timeout: Duration,
}

impl DecisionEngine {
    pub fn new(catalog: Arc<Catalog>, planner: Option<Box<dyn Planner>>) -> Self {
        match &planner {
            Some(p) => tracing::info!("decision engine using planner '{}'", p.label()),
            None => tracing::info!("no planner configured, using keyword matching"),
        }
        Self {
            catalog,
            planner,
            timeout: PLANNER_TIMEOUT,
        }
    }

    /// Keyword matching only.
    pub fn keyword_only(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn uses_planner(&self) -> bool {
        self.planner.is_some()
    }

    /// Pick units for `request`. Always non-empty, always catalog members.
    pub async fn determine_units(&self, request: &str, sample: Option<&str>) -> Vec<UnitName> {
        tracing::info!(
            "determining units for request: '{}...'",
            head(request, LOGGED_REQUEST_CHARS)
        );

        let Some(planner) = &self.planner else {
            return keywords::keyword_plan(&self.catalog, request);
        };

        match self.ask(planner.as_ref(), request, sample).await {
            Ok(plan) if !plan.is_empty() => {
                tracing::info!(
                    "planner selected: {}",
                    plan.iter().map(|u| u.as_str()).collect::<Vec<_>>().join(", ")
                );
                plan
            }
            Ok(_) => {
                tracing::warn!("planner suggested no valid units, falling back to keywords");
                keywords::keyword_plan(&self.catalog, request)
            }
            Err(e) => {
                tracing::warn!(error = %e, "planner failed, falling back to keywords");
                keywords::keyword_plan(&self.catalog, request)
            }
        }
    }

    async fn ask(
        &self,
        planner: &dyn Planner,
        request: &str,
        sample: Option<&str>,
    ) -> Result<Vec<UnitName>, DecisionError> {
        let prompt = PlanPrompt::new(&self.catalog, request, sample);
        tracing::debug!("planner prompt: {}", prompt.user);

        let raw = tokio::time::timeout(self.timeout, planner.propose(&prompt))
            .await
            .map_err(|_| DecisionError::Timeout(self.timeout))??;
        tracing::debug!("planner reply: {}", head(&raw, 100));

        let names = match parse::parse_plan(&raw) {
            Ok(names) => names,
            Err(DecisionError::UnexpectedShape(shape)) => {
                tracing::warn!("unexpected planner reply shape: {}", shape);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(parse::validate(&self.catalog, &names))
    }
}
