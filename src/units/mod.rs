pub mod boundary;
pub mod cleaning;
pub mod local;
pub mod process;
pub mod sentiment;
pub mod summarize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::UnitError;

/// One of the processing units a plan can name. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitName {
    DataCleaning,
    SentimentAnalysis,
    TextSummarization,
}

impl UnitName {
    /// Every unit, in fallback priority order.
    pub const ALL: [UnitName; 3] = [
        UnitName::DataCleaning,
        UnitName::SentimentAnalysis,
        UnitName::TextSummarization,
    ];

    /// The unit used when nothing else matches.
    pub const DEFAULT: UnitName = UnitName::DataCleaning;

    /// Wire name, also the container image suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitName::DataCleaning => "data-cleaning",
            UnitName::SentimentAnalysis => "sentiment-analysis",
            UnitName::TextSummarization => "text-summarization",
        }
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit name that isn't in the closed set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown unit: '{0}'")]
pub struct UnknownUnit(pub String);

impl FromStr for UnitName {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitName::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}

/// What each available unit does, in the words shown to the planner.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<(UnitName, String)>,
}

impl Catalog {
    pub fn new(entries: Vec<(UnitName, String)>) -> Self {
        Self { entries }
    }

    /// The three built-in units.
    pub fn standard() -> Self {
        Self::new(vec![
            (
                UnitName::DataCleaning,
                "Cleans text by removing special characters, normalizing spaces, and converting to lowercase".to_string(),
            ),
            (
                UnitName::SentimentAnalysis,
                "Analyzes the sentiment of text, providing a score from -1 (negative) to 1 (positive)".to_string(),
            ),
            (
                UnitName::TextSummarization,
                "Creates a concise summary of longer text by extracting key sentences".to_string(),
            ),
        ])
    }

    pub fn contains(&self, unit: UnitName) -> bool {
        self.entries.iter().any(|(u, _)| *u == unit)
    }

    /// Resolve a wire name to a unit that is actually in this catalog.
    pub fn lookup(&self, name: &str) -> Option<UnitName> {
        name.parse::<UnitName>()
            .ok()
            .filter(|unit| self.contains(*unit))
    }

    pub fn describe(&self, unit: UnitName) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, d)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitName, &str)> {
        self.entries.iter().map(|(u, d)| (*u, d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-invocation knobs. Only the summarizer reads any today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitParams {
    pub sentences: Option<usize>,
}

/// Run the transform behind `unit` directly on `text`.
pub fn apply(unit: UnitName, text: &str, params: &UnitParams) -> Result<String, UnitError> {
    match unit {
        UnitName::DataCleaning => Ok(cleaning::clean(text)),
        UnitName::SentimentAnalysis => {
            let report = sentiment::analyze(text);
            Ok(serde_json::to_string_pretty(&report)?)
        }
        UnitName::TextSummarization => Ok(summarize::summarize(
            text,
            params
                .sentences
                .unwrap_or(crate::consts::DEFAULT_SUMMARY_SENTENCES),
        )),
    }
}

/// Something that can run one processing unit.
#[async_trait]
pub trait Unit: Send + Sync {
    fn name(&self) -> UnitName;
    async fn process(&self, input: &str, params: &UnitParams) -> Result<String, UnitError>;
}

/// Maps each unit name to the runner that executes it. Immutable once built.
#[derive(Clone, Default)]
pub struct UnitRegistry {
    units: HashMap<UnitName, Arc<dyn Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a runner, replacing any previous one for the same unit.
    pub fn with(mut self, unit: Arc<dyn Unit>) -> Self {
        self.units.insert(unit.name(), unit);
        self
    }

    /// Every unit runs inside this process.
    pub fn in_process() -> Self {
        UnitName::ALL.into_iter().fold(Self::new(), |registry, name| {
            registry.with(Arc::new(local::InProcessUnit::new(name)))
        })
    }

    /// Every unit runs as an external process started by `launcher`.
    pub fn launched(launcher: process::Launcher, max_output_bytes: usize) -> Self {
        UnitName::ALL.into_iter().fold(Self::new(), |registry, name| {
            registry.with(Arc::new(process::ProcessUnit::new(
                name,
                launcher.clone(),
                max_output_bytes,
            )))
        })
    }

    pub fn get(&self, name: UnitName) -> Option<&Arc<dyn Unit>> {
        self.units.get(&name)
    }

    pub async fn invoke(
        &self,
        name: UnitName,
        input: &str,
        params: &UnitParams,
    ) -> Result<String, UnitError> {
        match self.units.get(&name) {
            Some(unit) => unit.process(input, params).await,
            None => Err(UnitError::NotRegistered(name.to_string())),
        }
    }

    pub fn names(&self) -> Vec<UnitName> {
        let mut names: Vec<_> = self.units.keys().copied().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitRegistry")
            .field("units", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_names_round_trip_wire_form() {
        for unit in UnitName::ALL {
            assert_eq!(unit.as_str().parse::<UnitName>().unwrap(), unit);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "image-resize".parse::<UnitName>().unwrap_err();
        assert_eq!(err, UnknownUnit("image-resize".to_string()));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&UnitName::TextSummarization).unwrap();
        assert_eq!(json, "\"text-summarization\"");
    }

    #[test]
    fn standard_catalog_describes_every_unit() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 3);
        for unit in UnitName::ALL {
            assert!(catalog.describe(unit).is_some());
        }
    }

    #[test]
    fn lookup_respects_catalog_contents() {
        let catalog = Catalog::new(vec![(UnitName::DataCleaning, "clean".to_string())]);
        assert_eq!(catalog.lookup("data-cleaning"), Some(UnitName::DataCleaning));
        assert_eq!(catalog.lookup("sentiment-analysis"), None);
        assert_eq!(catalog.lookup("nonsense"), None);
    }

    #[test]
    fn apply_sentiment_emits_json() {
        let out = apply(UnitName::SentimentAnalysis, "great day", &UnitParams::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["classification"], "positive");
    }

    #[tokio::test]
    async fn registry_reports_missing_unit() {
        let registry = UnitRegistry::new();
        let err = registry
            .invoke(UnitName::DataCleaning, "x", &UnitParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::NotRegistered(ref n) if n == "data-cleaning"));
    }

    #[tokio::test]
    async fn in_process_registry_covers_all_units() {
        let registry = UnitRegistry::in_process();
        assert_eq!(registry.names(), UnitName::ALL.to_vec());
        let out = registry
            .invoke(UnitName::DataCleaning, "Hi  THERE!", &UnitParams::default())
            .await
            .unwrap();
        assert_eq!(out, "hi there");
    }
}
