//! Turning a free-form LLM reply into a list of unit names.

use serde_json::Value;

use crate::error::DecisionError;
use crate::units::{Catalog, UnitName};

/// Extract the names from a reply shaped either as `["a", "b"]` or as
/// `{"containers": ["a", "b"]}`. Markdown fences are tolerated.
///
/// Non-string entries are skipped. Any other shape is `UnexpectedShape`.
pub fn parse_plan(text: &str) -> Result<Vec<String>, DecisionError> {
    let json_str = extract_json(text);
    let value: Value =
        serde_json::from_str(json_str).map_err(|source| DecisionError::MalformedResponse {
            source,
            raw: text.to_string(),
        })?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("containers") {
            Some(Value::Array(items)) => items,
            _ => return Err(DecisionError::UnexpectedShape(truncated(json_str))),
        },
        _ => return Err(DecisionError::UnexpectedShape(truncated(json_str))),
    };

    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name.clone()),
            other => {
                tracing::warn!("LLM suggested a non-string unit: {}", other);
                None
            }
        })
        .collect())
}

/// Keep only names the catalog knows, in order. Unknown names are logged.
pub fn validate(catalog: &Catalog, names: &[String]) -> Vec<UnitName> {
    names
        .iter()
        .filter_map(|name| match catalog.lookup(name) {
            Some(unit) => Some(unit),
            None => {
                tracing::warn!("LLM suggested invalid unit: '{}'", name);
                None
            }
        })
        .collect()
}

/// Extract JSON from text that may be wrapped in markdown code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}

fn truncated(text: &str) -> String {
    crate::consts::preview(text, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let names = parse_plan(r#"["data-cleaning", "sentiment-analysis"]"#).unwrap();
        assert_eq!(names, vec!["data-cleaning", "sentiment-analysis"]);
    }

    #[test]
    fn parses_containers_object() {
        let names = parse_plan(r#"{"containers": ["text-summarization"]}"#).unwrap();
        assert_eq!(names, vec!["text-summarization"]);
    }

    #[test]
    fn parses_fenced_json() {
        let names = parse_plan("```json\n[\"data-cleaning\"]\n```").unwrap();
        assert_eq!(names, vec!["data-cleaning"]);
    }

    #[test]
    fn parses_plain_fence() {
        let names = parse_plan("```\n{\"containers\": []}\n```").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_plan("run the cleaner please").unwrap_err();
        assert!(matches!(err, DecisionError::MalformedResponse { .. }));
    }

    #[test]
    fn object_without_containers_is_unexpected() {
        let err = parse_plan(r#"{"units": ["data-cleaning"]}"#).unwrap_err();
        assert!(matches!(err, DecisionError::UnexpectedShape(_)));
    }

    #[test]
    fn containers_not_an_array_is_unexpected() {
        let err = parse_plan(r#"{"containers": "data-cleaning"}"#).unwrap_err();
        assert!(matches!(err, DecisionError::UnexpectedShape(_)));
    }

    #[test]
    fn scalar_is_unexpected() {
        let err = parse_plan("42").unwrap_err();
        assert!(matches!(err, DecisionError::UnexpectedShape(_)));
    }

    #[test]
    fn non_string_entries_are_skipped() {
        let names = parse_plan(r#"["data-cleaning", 7, null, {"a": 1}]"#).unwrap();
        assert_eq!(names, vec!["data-cleaning"]);
    }

    #[test]
    fn validate_drops_unknown_names() {
        let names = vec![
            "data-cleaning".to_string(),
            "translate".to_string(),
            "text-summarization".to_string(),
        ];
        let plan = validate(&Catalog::standard(), &names);
        assert_eq!(plan, vec![UnitName::DataCleaning, UnitName::TextSummarization]);
    }

    #[test]
    fn validate_respects_catalog_subset() {
        let catalog = Catalog::new(vec![(UnitName::SentimentAnalysis, "s".to_string())]);
        let names = vec!["data-cleaning".to_string(), "sentiment-analysis".to_string()];
        assert_eq!(validate(&catalog, &names), vec![UnitName::SentimentAnalysis]);
    }

    #[test]
    fn validate_preserves_order() {
        let names = vec![
            "text-summarization".to_string(),
            "data-cleaning".to_string(),
        ];
        assert_eq!(
            validate(&Catalog::standard(), &names),
            vec![UnitName::TextSummarization, UnitName::DataCleaning]
        );
    }
}
