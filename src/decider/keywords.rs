//! Deterministic plan from trigger words, used whenever the LLM can't help.

use crate::units::{Catalog, UnitName};

/// Trigger words per unit, in the order units are appended to the plan.
const TRIGGERS: &[(UnitName, &[&str])] = &[
    (UnitName::DataCleaning, &["clean", "remove"]),
    (
        UnitName::SentimentAnalysis,
        &["sentiment", "analyze", "feeling", "emotion", "positive", "negative"],
    ),
    (
        UnitName::TextSummarization,
        &["summarize", "summary", "shorten", "brief", "concise"],
    ),
];

/// Scan the lowercased request for trigger words. Never empty.
pub fn keyword_plan(catalog: &Catalog, request: &str) -> Vec<UnitName> {
    let lowered = request.to_lowercase();

    let plan: Vec<UnitName> = TRIGGERS
        .iter()
        .filter(|(unit, words)| {
            catalog.contains(*unit) && words.iter().any(|w| lowered.contains(w))
        })
        .map(|(unit, _)| *unit)
        .collect();

    if !plan.is_empty() {
        tracing::debug!("keyword match selected {:?}", plan);
        return plan;
    }

    let default = if catalog.contains(UnitName::DEFAULT) {
        UnitName::DEFAULT
    } else {
        catalog
            .iter()
            .map(|(unit, _)| unit)
            .next()
            .unwrap_or(UnitName::DEFAULT)
    };
    tracing::info!("no specific units matched, using default unit {}", default);
    vec![default]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(request: &str) -> Vec<UnitName> {
        keyword_plan(&Catalog::standard(), request)
    }

    #[test]
    fn clean_and_sentiment() {
        assert_eq!(
            plan("Clean this text and analyze sentiment"),
            vec![UnitName::DataCleaning, UnitName::SentimentAnalysis]
        );
    }

    #[test]
    fn summarize_only() {
        assert_eq!(plan("Summarize this article"), vec![UnitName::TextSummarization]);
    }

    #[test]
    fn priority_order_ignores_request_order() {
        assert_eq!(
            plan("Give me a brief version, then remove the junk"),
            vec![UnitName::DataCleaning, UnitName::TextSummarization]
        );
    }

    #[test]
    fn all_three() {
        assert_eq!(
            plan("Clean it, tell me the emotion, and make it concise"),
            UnitName::ALL.to_vec()
        );
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(plan("SENTIMENT please"), vec![UnitName::SentimentAnalysis]);
    }

    #[test]
    fn no_match_defaults_to_cleaning() {
        assert_eq!(plan("do the thing"), vec![UnitName::DataCleaning]);
        assert_eq!(plan(""), vec![UnitName::DataCleaning]);
    }

    #[test]
    fn respects_catalog_subset() {
        let catalog = Catalog::new(vec![(UnitName::TextSummarization, "s".to_string())]);
        assert_eq!(
            keyword_plan(&catalog, "clean and summarize"),
            vec![UnitName::TextSummarization]
        );
        assert_eq!(
            keyword_plan(&catalog, "nothing relevant"),
            vec![UnitName::TextSummarization]
        );
    }
}
