use crate::consts::SAMPLE_CHARS;
use crate::units::Catalog;

const INTRO: &str =
    "You are an orchestrator that decides which processing units to run based on user requests.";
const TASK: &str = "Your task is to determine which units should be executed and in what order based on the user's request.";
const RESPONSE_FORMAT: &str = "Respond with ONLY a JSON object of the form {\"containers\": [\"unit-name\", ...]} listing unit names in execution order.";
const RULES: &[&str] = &[
    "Output JSON only. No markdown, no extra text, no extra keys.",
    "Use only the unit names listed above. Never invent units.",
    "Each unit appears at most once.",
];
const EXAMPLES: &[(&str, &str)] = &[
    (
        "Clean this text and analyze its sentiment",
        "{\"containers\": [\"data-cleaning\", \"sentiment-analysis\"]}",
    ),
    (
        "Summarize this article",
        "{\"containers\": [\"text-summarization\"]}",
    ),
    (
        "Clean and summarize this text",
        "{\"containers\": [\"data-cleaning\", \"text-summarization\"]}",
    ),
];

pub fn build_plan_system_prompt(catalog: &Catalog) -> String {
    let units = catalog
        .iter()
        .map(|(name, description)| format!("- {}: {}", name, description))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    let examples = EXAMPLES
        .iter()
        .map(|(request, output)| format!("User: \"{}\"\nOutput: {}", request, output))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{INTRO}\n\nAvailable units:\n{units}\n\n{TASK}\n{RESPONSE_FORMAT}\n\nRules:\n{rules}\n\nExamples:\n{examples}\n"
    )
}

/// The user turn: the request, plus a peek at the text when we have one.
pub fn build_plan_user_message(request: &str, sample: Option<&str>) -> String {
    match sample.filter(|s| !s.is_empty()) {
        Some(sample) => format!(
            "User request: {}\nSample of the input text: '{}...'",
            request,
            crate::consts::head(sample, SAMPLE_CHARS)
        ),
        None => format!("User request: {}", request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitName;

    #[test]
    fn prompt_lists_every_catalog_unit() {
        let prompt = build_plan_system_prompt(&Catalog::standard());
        for unit in UnitName::ALL {
            assert!(prompt.contains(&format!("- {}: ", unit)));
        }
    }

    #[test]
    fn prompt_only_lists_catalog_units() {
        let catalog = Catalog::new(vec![(UnitName::DataCleaning, "cleans".to_string())]);
        let prompt = build_plan_system_prompt(&catalog);
        assert!(prompt.contains("- data-cleaning: cleans"));
        assert!(!prompt.contains("- sentiment-analysis:"));
    }

    #[test]
    fn prompt_describes_response_shape() {
        let prompt = build_plan_system_prompt(&Catalog::standard());
        assert!(prompt.contains("\"containers\""));
        assert!(!prompt.contains("```"));
    }

    #[test]
    fn prompt_includes_rules_and_examples() {
        let prompt = build_plan_system_prompt(&Catalog::standard());
        for rule in RULES {
            assert!(prompt.contains(rule));
        }
        for (request, _) in EXAMPLES {
            assert!(prompt.contains(request));
        }
    }

    #[test]
    fn user_message_without_sample() {
        assert_eq!(
            build_plan_user_message("Summarize this", None),
            "User request: Summarize this"
        );
    }

    #[test]
    fn user_message_truncates_sample() {
        let sample = "x".repeat(250);
        let message = build_plan_user_message("Clean it", Some(&sample));
        assert!(message.starts_with("User request: Clean it\nSample of the input text: '"));
        assert!(message.contains(&format!("'{}...'", "x".repeat(100))));
        assert!(!message.contains(&"x".repeat(101)));
    }

    #[test]
    fn empty_sample_is_ignored() {
        assert_eq!(build_plan_user_message("Go", Some("")), "User request: Go");
    }
}
