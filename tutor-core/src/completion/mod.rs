//! Completion capability abstraction
//!
//! The completion capability is the only suspending collaborator in the
//! engine: an opaque, possibly-failing remote call that turns a structured
//! prompt into generated text.

pub mod mock;
pub mod traits;

use std::time::Duration;

use crate::error::CompletionError;

pub use mock::MockCompletion;
pub use traits::{CompletionCapability, PromptContext, PromptMessage, Role};

/// Call a completion capability with a deadline and bounded retries
///
/// Each attempt gets its own deadline. Retries never outlive the calling
/// turn; after the last attempt the error is surfaced to the caller.
pub async fn generate_bounded(
    capability: &dyn CompletionCapability,
    ctx: &PromptContext,
    deadline: Duration,
    retries: u32,
) -> Result<String, CompletionError> {
    let mut last_error = CompletionError::Timeout;

    for attempt in 0..=retries {
        match tokio::time::timeout(deadline, capability.generate(ctx.clone())).await {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => {
                tracing::warn!(attempt, error = %e, "completion call failed");
                last_error = e;
            }
            Err(_) => {
                tracing::warn!(attempt, "completion call exceeded deadline");
                last_error = CompletionError::Timeout;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_bounded_returns_first_success() {
        let completion = MockCompletion::new();
        completion.queue_text("hello").await;

        let ctx = PromptContext::system("sys");
        let result = generate_bounded(&completion, &ctx, Duration::from_secs(1), 1).await;
        assert_eq!(result.unwrap(), "hello");
    }

    #[tokio::test]
    async fn generate_bounded_retries_after_failure() {
        let completion = MockCompletion::new();
        completion
            .queue_error(CompletionError::Unavailable("down".to_string()))
            .await;
        completion.queue_text("recovered").await;

        let ctx = PromptContext::system("sys");
        let result = generate_bounded(&completion, &ctx, Duration::from_secs(1), 1).await;
        assert_eq!(result.unwrap(), "recovered");
    }

    #[tokio::test]
    async fn generate_bounded_surfaces_error_after_exhausting_retries() {
        let completion = MockCompletion::new();
        completion.queue_error(CompletionError::Timeout).await;
        completion.queue_error(CompletionError::Timeout).await;

        let ctx = PromptContext::system("sys");
        let result = generate_bounded(&completion, &ctx, Duration::from_secs(1), 1).await;
        assert_eq!(result.unwrap_err(), CompletionError::Timeout);
    }

    #[tokio::test]
    async fn generate_bounded_zero_retries_fails_on_first_error() {
        let completion = MockCompletion::new();
        completion
            .queue_error(CompletionError::Unavailable("down".to_string()))
            .await;
        completion.queue_text("never used").await;

        let ctx = PromptContext::system("sys");
        let result = generate_bounded(&completion, &ctx, Duration::from_secs(1), 0).await;
        assert!(matches!(result, Err(CompletionError::Unavailable(_))));
        assert_eq!(completion.queued_count().await, 1);
    }
}
