use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;
use crate::consts::PLANNER_MAX_TOKENS;
use crate::error::DecisionError;

use super::{PlanPrompt, Planner};

/// A planner backed by any OpenAI-compatible chat completions endpoint.
pub struct ChatPlanner {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatPlanner {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build from settings. Fails with `MissingApiKey` when no key is set.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, DecisionError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(DecisionError::MissingApiKey)?;
        Ok(Self::new(&settings.api_url, api_key, &settings.model))
    }

    fn build_request<'a>(&'a self, prompt: &'a PlanPrompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            max_tokens: PLANNER_MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        }
    }

    fn extract_content(resp: ChatResponse) -> Result<String, DecisionError> {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(DecisionError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Planner for ChatPlanner {
    fn label(&self) -> &str {
        &self.model
    }

    async fn propose(&self, prompt: &PlanPrompt) -> Result<String, DecisionError> {
        let body = self.build_request(prompt);

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(DecisionError::Status { status, body });
        }

        let api_resp: ChatResponse = resp.json().await?;

        if let Some(usage) = &api_resp.usage {
            tracing::debug!(
                "planner tokens: input {}, output {}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Self::extract_content(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
