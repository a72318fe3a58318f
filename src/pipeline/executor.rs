use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::UnitError;
use crate::units::{UnitName, UnitParams, UnitRegistry};

use super::{Mode, Outcome, Run, StepResult};

/// Runs plans against a fixed registry of units.
#[derive(Debug, Clone)]
pub struct Executor {
    registry: Arc<UnitRegistry>,
    timeout: Duration,
}

impl Executor {
    pub fn new(registry: Arc<UnitRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute `plan` on `input`.
    ///
    /// Parallel mode only kicks in when asked for and there is more than one
    /// unit; `Run::mode` says which mode actually ran. An empty plan runs
    /// [`UnitName::DEFAULT`] alone.
    pub async fn run(
        &self,
        plan: &[UnitName],
        input: &str,
        params: &UnitParams,
        parallel: bool,
    ) -> Run {
        let plan = if plan.is_empty() {
            tracing::warn!("empty plan, running default unit {}", UnitName::DEFAULT);
            &[UnitName::DEFAULT][..]
        } else {
            plan
        };
        if parallel && plan.len() > 1 {
            tracing::info!("running {} units in parallel", plan.len());
            self.run_parallel(plan, input, params).await
        } else {
            tracing::info!("running {} unit(s) sequentially", plan.len());
            self.run_sequential(plan, input, params).await
        }
    }

    async fn run_sequential(&self, plan: &[UnitName], input: &str, params: &UnitParams) -> Run {
        let mut current = input.to_string();
        let mut results = Vec::with_capacity(plan.len());

        for &unit in plan {
            let step = self.invoke(unit, &current, params).await;
            let failed = match &step.outcome {
                Outcome::Success(out) => {
                    current = out.clone();
                    false
                }
                Outcome::Error(_) => true,
            };
            results.push(step);
            if failed {
                tracing::warn!("stopping chain after {} failed", unit);
                break;
            }
        }

        Run {
            mode: Mode::Sequential,
            results,
            output: current,
        }
    }

    async fn run_parallel(&self, plan: &[UnitName], input: &str, params: &UnitParams) -> Run {
        let futures: Vec<_> = plan
            .iter()
            .map(|&unit| self.invoke(unit, input, params))
            .collect();

        let results = futures::future::join_all(futures).await;

        let output = results
            .iter()
            .rev()
            .find_map(StepResult::output)
            .unwrap_or(input)
            .to_string();

        Run {
            mode: Mode::Parallel,
            results,
            output,
        }
    }

    async fn invoke(&self, unit: UnitName, input: &str, params: &UnitParams) -> StepResult {
        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.timeout,
            self.registry.invoke(unit, input, params),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(UnitError::Timeout(self.timeout)),
        };

        match result {
            Ok(output) => {
                tracing::info!(
                    unit = %unit,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "unit completed"
                );
                StepResult::success(unit, output)
            }
            Err(e) => {
                tracing::error!(unit = %unit, error = %e, "unit failed");
                StepResult::error(unit, e.to_string())
            }
        }
    }
}
