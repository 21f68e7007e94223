//! Teaching strategy
//!
//! Produces instructional content for a knowledge item through the
//! completion capability. A single generic implementation parameterized by
//! item data covers all subjects; the remediation variant switches to
//! simplified scaffolding until the flag clears.

use std::sync::Arc;

use async_trait::async_trait;

use tutor_catalog::{KnowledgeItem, Question};

use crate::completion::{CompletionCapability, PromptContext, PromptMessage, generate_bounded};
use crate::config::TutorConfig;
use crate::error::CompletionError;

/// Produces the next instructional content for a knowledge item
#[async_trait]
pub trait TeachingStrategy: Send + Sync {
    /// Generate the next teaching reply for the student's utterance
    ///
    /// `history` is the bounded conversation window; `remediation_active`
    /// selects the simplified variant.
    async fn next_prompt(
        &self,
        item: &KnowledgeItem,
        utterance: &str,
        history: &[PromptMessage],
        remediation_active: bool,
    ) -> Result<String, CompletionError>;

    /// Layered hints for a question, without revealing the answer
    async fn hints_for(
        &self,
        item: &KnowledgeItem,
        question: &Question,
    ) -> Result<String, CompletionError>;

    /// Remediation interlude shown when the failure threshold is crossed
    async fn remediation_interlude(
        &self,
        item: &KnowledgeItem,
        failures: u32,
    ) -> Result<String, CompletionError>;
}

/// Prompt-driven teaching strategy
pub struct PromptedTeaching {
    completion: Arc<dyn CompletionCapability>,
    config: TutorConfig,
}

impl PromptedTeaching {
    pub fn new(completion: Arc<dyn CompletionCapability>, config: TutorConfig) -> Self {
        Self { completion, config }
    }

    /// System prompt built from the item's data
    fn system_prompt(&self, item: &KnowledgeItem, remediation_active: bool) -> String {
        let mut prompt = format!(
            "You are an experienced {} tutor teaching \"{}\".\n\n\
             Content:\n{}\n\nKey points:\n",
            item.subject.display_name(),
            item.title,
            item.content,
        );
        for point in &item.key_points {
            prompt.push_str("- ");
            prompt.push_str(point);
            prompt.push('\n');
        }
        if !item.common_misconceptions.is_empty() {
            prompt.push_str("\nCommon misconceptions to watch for:\n");
            for m in &item.common_misconceptions {
                prompt.push_str("- ");
                prompt.push_str(m);
                prompt.push('\n');
            }
        }
        if !item.teaching_hints.is_empty() {
            prompt.push_str("\nTeaching hints:\n");
            for h in &item.teaching_hints {
                prompt.push_str("- ");
                prompt.push_str(h);
                prompt.push('\n');
            }
        }

        if remediation_active {
            prompt.push_str(
                "\nThe student has struggled repeatedly with this item. \
                 Switch to simplified teaching: restate one key point at a \
                 time in plainer language, use an everyday example, break \
                 explanations into the smallest possible steps, and be \
                 encouraging.",
            );
        } else {
            prompt.push_str(
                "\nUse Socratic questioning, vivid analogies, and \
                 constructive feedback. Keep replies concise and invite the \
                 student to practice once an explanation lands.",
            );
        }
        prompt
    }

    async fn generate(&self, ctx: PromptContext) -> Result<String, CompletionError> {
        generate_bounded(
            self.completion.as_ref(),
            &ctx,
            self.config.completion_timeout(),
            self.config.completion_retries,
        )
        .await
    }
}

#[async_trait]
impl TeachingStrategy for PromptedTeaching {
    async fn next_prompt(
        &self,
        item: &KnowledgeItem,
        utterance: &str,
        history: &[PromptMessage],
        remediation_active: bool,
    ) -> Result<String, CompletionError> {
        let mut ctx = PromptContext::system(self.system_prompt(item, remediation_active));
        for message in history {
            ctx = ctx.with_message(message.clone());
        }
        ctx = ctx.with_message(PromptMessage::user(utterance));
        self.generate(ctx).await
    }

    async fn hints_for(
        &self,
        item: &KnowledgeItem,
        question: &Question,
    ) -> Result<String, CompletionError> {
        let mut request = format!(
            "The student asked for a hint on this question. Give three \
             layered hints (approach, method, what to double-check) without \
             revealing the final answer or a choice letter.\n\nQuestion:\n{}",
            question.prompt,
        );
        if !question.choices.is_empty() {
            request.push_str("\nChoices:\n");
            request.push_str(&question.choices.join("\n"));
        }

        let ctx = PromptContext::system(self.system_prompt(item, false))
            .with_message(PromptMessage::user(request));
        self.generate(ctx).await
    }

    async fn remediation_interlude(
        &self,
        item: &KnowledgeItem,
        failures: u32,
    ) -> Result<String, CompletionError> {
        let request = format!(
            "The student has failed {} attempts in a row on \"{}\". \
             Re-explain the core concept in simpler language, give one \
             everyday example, break it into smaller steps, and encourage \
             the student.",
            failures, item.title,
        );
        let ctx = PromptContext::system(self.system_prompt(item, true))
            .with_message(PromptMessage::user(request));
        self.generate(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletion;
    use tutor_catalog::{QuestionType, Subject};

    fn item() -> KnowledgeItem {
        let mut item = KnowledgeItem::new(
            Subject::LanguageArts,
            "Rhetorical devices",
            "Simile, personification, hyperbole and friends.",
        );
        item.key_points = vec!["A simile needs a comparison word".to_string()];
        item.common_misconceptions = vec!["Confusing simile and personification".to_string()];
        item.teaching_hints = vec!["Ask what the thing is being likened to".to_string()];
        item
    }

    fn strategy(completion: Arc<MockCompletion>) -> PromptedTeaching {
        PromptedTeaching::new(completion, TutorConfig::default())
    }

    #[tokio::test]
    async fn next_prompt_sends_item_data_and_history() {
        let completion = Arc::new(MockCompletion::new());
        completion.queue_text("Let's look at similes.").await;
        let teaching = strategy(Arc::clone(&completion));

        let history = vec![
            PromptMessage::user("what is a simile?"),
            PromptMessage::assistant("A comparison using 'like' or 'as'."),
        ];
        let reply = teaching
            .next_prompt(&item(), "got it, another example?", &history, false)
            .await
            .unwrap();
        assert_eq!(reply, "Let's look at similes.");

        let seen = completion.seen_prompts().await;
        assert_eq!(seen.len(), 1);
        assert!(seen[0].system.contains("Rhetorical devices"));
        assert!(seen[0].system.contains("comparison word"));
        assert!(seen[0].system.contains("misconceptions"));
        // history + current utterance
        assert_eq!(seen[0].messages.len(), 3);
        assert_eq!(seen[0].messages[2].content, "got it, another example?");
    }

    #[tokio::test]
    async fn remediation_variant_switches_scaffolding() {
        let completion = Arc::new(MockCompletion::new());
        completion.queue_text("simplified").await;
        completion.queue_text("normal").await;
        let teaching = strategy(Arc::clone(&completion));

        teaching
            .next_prompt(&item(), "still confused", &[], true)
            .await
            .unwrap();
        teaching
            .next_prompt(&item(), "tell me more", &[], false)
            .await
            .unwrap();

        let seen = completion.seen_prompts().await;
        assert!(seen[0].system.contains("simplified teaching"));
        assert!(!seen[1].system.contains("simplified teaching"));
        assert!(seen[1].system.contains("Socratic"));
    }

    #[tokio::test]
    async fn hints_do_not_include_answer_key() {
        let completion = Arc::new(MockCompletion::new());
        completion.queue_text("Hint 1...").await;
        let teaching = strategy(Arc::clone(&completion));

        let mut question = Question::new(
            "item",
            QuestionType::MultipleChoice,
            2,
            "Which device appears in 'the wind whispered'?",
            "B",
        );
        question.choices = vec!["A. Simile".to_string(), "B. Personification".to_string()];

        teaching.hints_for(&item(), &question).await.unwrap();

        let seen = completion.seen_prompts().await;
        let user = &seen[0].messages[0].content;
        assert!(user.contains("without"));
        assert!(user.contains("the wind whispered"));
        // The answer key itself is never placed in the hint request
        assert!(!user.contains("\nB\n"));
    }

    #[tokio::test]
    async fn remediation_interlude_mentions_failure_count() {
        let completion = Arc::new(MockCompletion::new());
        completion.queue_text("Let's slow down.").await;
        let teaching = strategy(Arc::clone(&completion));

        teaching.remediation_interlude(&item(), 3).await.unwrap();

        let seen = completion.seen_prompts().await;
        assert!(seen[0].messages[0].content.contains("failed 3 attempts"));
        assert!(seen[0].system.contains("simplified teaching"));
    }

    #[tokio::test]
    async fn channel_failure_propagates() {
        let completion = Arc::new(MockCompletion::new());
        // Both the call and its retry fail
        completion
            .queue_error(crate::error::CompletionError::Timeout)
            .await;
        completion
            .queue_error(crate::error::CompletionError::Timeout)
            .await;
        let teaching = strategy(completion);

        let result = teaching.next_prompt(&item(), "hi", &[], false).await;
        assert_eq!(result.unwrap_err(), CompletionError::Timeout);
    }
}
