use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::TextGenerator;
use crate::error::SentinelError;

enum Behavior {
    Text(String),
    Empty,
    /// The stored error is handed out on the first call; later calls get a
    /// generic connection failure since `SentinelError` is not `Clone`.
    Fail(Mutex<Option<SentinelError>>),
}

/// Text generator that returns a canned answer and records every prompt.
pub struct MockTextGenerator {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Text(text.into()))
    }

    /// Service answers but produces no candidate text.
    pub fn empty() -> Self {
        Self::with_behavior(Behavior::Empty)
    }

    pub fn failing(err: SentinelError) -> Self {
        Self::with_behavior(Behavior::Fail(Mutex::new(Some(err))))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, SentinelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.behavior {
            Behavior::Text(text) => Ok(Some(text.clone())),
            Behavior::Empty => Ok(None),
            Behavior::Fail(err) => Err(err.lock().unwrap().take().unwrap_or_else(|| {
                SentinelError::CollaboratorUnavailable("mock AI service is down".into())
            })),
        }
    }
}
