//! Runtime settings, read once from the environment and then overridden by
//! command-line flags. Nothing here is global: the binary builds a
//! [`Settings`] and hands the pieces to whoever needs them.

use clap::ValueEnum;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::consts::{
    DEFAULT_API_URL, DEFAULT_IMAGE_PREFIX, DEFAULT_MODEL, DEFAULT_UNIT_TIMEOUT,
    MAX_UNIT_OUTPUT_BYTES, PLANNER_TIMEOUT,
};
use crate::decider::Planner;
use crate::decider::llm::ChatPlanner;
use crate::error::DecisionError;
use crate::units::UnitRegistry;
use crate::units::process::Launcher;

pub const ENV_API_KEY: &str = "LLM_API_KEY";
pub const ENV_API_URL: &str = "LLM_API_URL";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_IMAGE_PREFIX: &str = "SLUICE_IMAGE_PREFIX";

/// Where the planner lives and how long we wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: PLANNER_TIMEOUT,
        }
    }
}

/// How units are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunnerKind {
    /// `docker run --rm -i <prefix>/<unit>`
    #[default]
    Docker,
    /// This binary's own `unit` subcommand
    Binary,
    /// Call the transforms directly, no child process
    InProcess,
}

impl RunnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RunnerKind::Docker => "docker",
            RunnerKind::Binary => "binary",
            RunnerKind::InProcess => "in-process",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub llm: LlmSettings,
    /// When false the decision engine never calls the LLM.
    pub use_llm: bool,
    pub runner: RunnerKind,
    pub image_prefix: String,
    /// Binary started by `RunnerKind::Binary`; defaults to the current executable.
    pub unit_program: Option<PathBuf>,
    pub unit_timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            use_llm: true,
            runner: RunnerKind::default(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            unit_program: None,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            max_output_bytes: MAX_UNIT_OUTPUT_BYTES,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            llm: LlmSettings {
                api_key: get(ENV_API_KEY),
                api_url: get(ENV_API_URL).unwrap_or(defaults.llm.api_url),
                model: get(ENV_MODEL).unwrap_or(defaults.llm.model),
                timeout: defaults.llm.timeout,
            },
            image_prefix: get(ENV_IMAGE_PREFIX).unwrap_or(defaults.image_prefix),
            ..defaults
        }
    }

    /// The planner to consult, if the LLM is enabled and a key is set.
    pub fn planner(&self) -> Option<Box<dyn Planner>> {
        if !self.use_llm {
            tracing::info!("LLM planning disabled");
            return None;
        }
        match ChatPlanner::from_settings(&self.llm) {
            Ok(planner) => Some(Box::new(planner)),
            Err(DecisionError::MissingApiKey) => {
                tracing::warn!("{} not set, using keyword matching only", ENV_API_KEY);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "planner unavailable, using keyword matching only");
                None
            }
        }
    }

    /// Launcher for external units, or `None` when units run in-process.
    pub fn launcher(&self) -> io::Result<Option<Launcher>> {
        Ok(match self.runner {
            RunnerKind::Docker => Some(Launcher::Docker {
                image_prefix: self.image_prefix.clone(),
            }),
            RunnerKind::Binary => Some(match &self.unit_program {
                Some(program) => Launcher::Binary {
                    program: program.clone(),
                },
                None => Launcher::current_exe()?,
            }),
            RunnerKind::InProcess => None,
        })
    }

    pub fn registry(&self) -> io::Result<UnitRegistry> {
        Ok(match self.launcher()? {
            Some(launcher) => UnitRegistry::launched(launcher, self.max_output_bytes),
            None => UnitRegistry::in_process(),
        })
    }
}
