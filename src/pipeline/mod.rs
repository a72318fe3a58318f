//! Running a plan: feeding text through units and recording each step.

pub mod executor;

pub use executor::Executor;

use serde::{Serialize, Serializer};

use crate::consts::{PREVIEW_CHARS, preview};
use crate::units::UnitName;

/// Outcome of a single unit invocation. Errors are information, not failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    Error(String),
}

/// One executed step of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub unit: UnitName,
    pub outcome: Outcome,
}

impl StepResult {
    pub fn success(unit: UnitName, output: impl Into<String>) -> Self {
        Self {
            unit,
            outcome: Outcome::Success(output.into()),
        }
    }

    pub fn error(unit: UnitName, message: impl Into<String>) -> Self {
        Self {
            unit,
            outcome: Outcome::Error(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Full output, if the step succeeded.
    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(out) => Some(out),
            Outcome::Error(_) => None,
        }
    }
}

// On the wire a step carries a preview, never the full output.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum StepRecord<'a> {
    Success {
        unit: UnitName,
        output_preview: String,
    },
    Error {
        unit: UnitName,
        error: &'a str,
    },
}

impl Serialize for StepResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match &self.outcome {
            Outcome::Success(out) => StepRecord::Success {
                unit: self.unit,
                output_preview: preview(out, PREVIEW_CHARS),
            },
            Outcome::Error(err) => StepRecord::Error {
                unit: self.unit,
                error: err,
            },
        };
        record.serialize(serializer)
    }
}

/// How a plan was actually executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Sequential,
    Parallel,
}

impl Mode {
    pub fn is_parallel(self) -> bool {
        self == Mode::Parallel
    }
}

/// Everything a plan run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub mode: Mode,
    pub results: Vec<StepResult>,
    pub output: String,
}
