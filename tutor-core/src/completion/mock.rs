//! Mock completion capability for testing
//!
//! MockCompletion allows scripting generated text and channel failures,
//! enabling fast, deterministic testing of grading and teaching logic.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::{CompletionCapability, PromptContext};
use crate::error::CompletionError;

/// Mock implementation of CompletionCapability
///
/// Queue results with `queue_text()` / `queue_error()` before the call.
/// Each `generate()` consumes one queued result; an empty queue reports
/// the capability as unavailable.
pub struct MockCompletion {
    /// Queued results (each generate() consumes one)
    results: Mutex<VecDeque<Result<String, CompletionError>>>,
    /// Prompts seen, for assertions on what the engine sent
    seen: Mutex<Vec<PromptContext>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful generation
    pub async fn queue_text(&self, text: impl Into<String>) {
        self.results.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a channel failure
    pub async fn queue_error(&self, error: CompletionError) {
        self.results.lock().await.push_back(Err(error));
    }

    /// Number of results still queued
    pub async fn queued_count(&self) -> usize {
        self.results.lock().await.len()
    }

    /// Prompts the engine has sent so far
    pub async fn seen_prompts(&self) -> Vec<PromptContext> {
        self.seen.lock().await.clone()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionCapability for MockCompletion {
    async fn generate(&self, ctx: PromptContext) -> Result<String, CompletionError> {
        self.seen.lock().await.push(ctx);
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::Unavailable(
                    "no queued response in MockCompletion".to_string(),
                ))
            })
    }
}
