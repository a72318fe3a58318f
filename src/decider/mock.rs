use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::DecisionError;

use super::{PlanPrompt, Planner};

/// One scripted planner reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw reply text, parsed like a real LLM reply.
    Text(String),
    /// An HTTP-style failure with the given status.
    Fail(u16),
    /// Sleep this long before answering with an empty plan.
    Stall(Duration),
}

impl MockReply {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }
}

/// A scripted planner for tests. Returns pre-defined replies in order and
/// records every prompt it receives.
pub struct MockPlanner {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<PlanPrompt>>,
}

impl MockPlanner {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<PlanPrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Planner for MockPlanner {
    fn label(&self) -> &str {
        "mock"
    }

    async fn propose(&self, prompt: &PlanPrompt) -> Result<String, DecisionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(i) {
            Some(MockReply::Text(raw)) => Ok(raw.clone()),
            Some(MockReply::Fail(status)) => Err(DecisionError::Status {
                status: *status,
                body: format!("MockPlanner: scripted failure on call {}", i + 1),
            }),
            Some(MockReply::Stall(delay)) => {
                tokio::time::sleep(*delay).await;
                Ok("[]".to_string())
            }
            None => Err(DecisionError::Status {
                status: 500,
                body: format!("MockPlanner: no more replies (called {} times)", i + 1),
            }),
        }
    }
}
