//! Project-wide constants.

use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// OpenAI-compatible chat completions endpoint used when `LLM_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Model used for planning when `LLM_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Token cap for the planning reply. A unit list is tiny.
pub const PLANNER_MAX_TOKENS: u32 = 200;

/// How long the planner may take before we fall back to keywords.
pub const PLANNER_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a single unit invocation may run.
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Image namespace for the unit containers (`<prefix>/<unit-name>`).
pub const DEFAULT_IMAGE_PREFIX: &str = "ai-orchestrator";

/// Sentences kept by the summarizer when the request doesn't say.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// Characters of input text shown to the planner.
pub const SAMPLE_CHARS: usize = 100;

/// Characters of a request echoed into the log.
pub const LOGGED_REQUEST_CHARS: usize = 50;

/// Characters kept in a step's output preview.
pub const PREVIEW_CHARS: usize = 100;

/// Characters of final output printed by the CLI report.
pub const REPORT_OUTPUT_CHARS: usize = 1000;

/// Largest stdout a unit process may produce before its step fails.
/// Stderr is read up to the same size and truncated for display.
pub const MAX_UNIT_OUTPUT_BYTES: usize = 64 * 1024 * 1024;

/// Truncate `text` to at most `max` characters, appending `...` when cut.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// First `max` characters of `text`, without any marker.
pub fn head(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
