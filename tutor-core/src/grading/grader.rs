//! AssessmentGrader trait and the rubric-based implementation

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tutor_catalog::{Question, QuestionType};

use super::level::{GradeLevel, GradedAnswer};
use crate::completion::{CompletionCapability, PromptContext, PromptMessage, generate_bounded};
use crate::config::TutorConfig;
use crate::error::GraderError;

/// Grades a student answer against a question and its rubric
#[async_trait]
pub trait AssessmentGrader: Send + Sync {
    /// Grade an answer into one of the three confidence levels
    ///
    /// Errors are grading-channel failures and must never be treated as
    /// student failures by the caller.
    async fn grade(&self, question: &Question, answer: &str) -> Result<GradedAnswer, GraderError>;
}

/// Single generic grader implementation
///
/// Objective types are matched deterministically against the answer key.
/// Open-ended types are judged by the completion capability and parsed
/// fail-closed: output outside the A/B/C vocabulary is an error, not a C.
pub struct RubricGrader {
    completion: Arc<dyn CompletionCapability>,
    config: TutorConfig,
}

impl RubricGrader {
    pub fn new(completion: Arc<dyn CompletionCapability>, config: TutorConfig) -> Self {
        Self { completion, config }
    }

    /// Deterministic grading for objective question types
    fn grade_objective(&self, question: &Question, answer: &str) -> GradedAnswer {
        let key = normalize(&question.answer_key);
        let given = normalize(answer);

        match question.question_type {
            QuestionType::MultipleChoice => {
                // Accept the bare key, the key as the leading token ("b."),
                // or the full text of the keyed choice; anything else is a
                // mismatch, never a prefix guess
                let first_token = given
                    .split(|c: char| !c.is_alphanumeric())
                    .next()
                    .unwrap_or("");
                let full_choice_match = question
                    .choices
                    .iter()
                    .map(|choice| normalize(choice))
                    .any(|choice| choice == given && choice.starts_with(&key));
                let matched = !given.is_empty()
                    && (given == key || first_token == key || full_choice_match);
                if matched {
                    GradedAnswer::new(GradeLevel::A, "Correct choice.")
                } else {
                    GradedAnswer::new(GradeLevel::C, "That is not the right choice.")
                }
            }
            QuestionType::TrueFalse => {
                let truthy = ["true", "t", "yes", "correct", "right"];
                let falsy = ["false", "f", "no", "incorrect", "wrong"];
                let key_is_true = truthy.contains(&key.as_str());
                let answer_side = if truthy.iter().any(|k| given == *k) {
                    Some(true)
                } else if falsy.iter().any(|k| given == *k) {
                    Some(false)
                } else {
                    None
                };
                match answer_side {
                    Some(side) if side == key_is_true => {
                        GradedAnswer::new(GradeLevel::A, "Correct.")
                    }
                    _ => GradedAnswer::new(GradeLevel::C, "That is not correct."),
                }
            }
            QuestionType::FillBlank => {
                if given == key {
                    return GradedAnswer::new(GradeLevel::A, "Exactly right.");
                }
                let keywords: Vec<&str> = key.split_whitespace().collect();
                if keywords.is_empty() {
                    return GradedAnswer::new(GradeLevel::C, "No answer key available.");
                }
                let hits = keywords.iter().filter(|k| given.contains(**k)).count();
                let ratio = hits as f64 / keywords.len() as f64;
                if ratio >= self.config.partial_match_threshold {
                    GradedAnswer::new(
                        GradeLevel::B,
                        "Close - part of the expected answer is there.",
                    )
                } else {
                    GradedAnswer::new(GradeLevel::C, "That does not match the expected answer.")
                }
            }
            // Open-ended types never reach here
            QuestionType::ShortAnswer | QuestionType::Application => {
                GradedAnswer::new(GradeLevel::C, "Open-ended question graded objectively.")
            }
        }
    }

    /// Grade an open-ended answer via the completion capability
    async fn grade_open_ended(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<GradedAnswer, GraderError> {
        let ctx = grading_prompt(question, answer);
        let output = generate_bounded(
            self.completion.as_ref(),
            &ctx,
            self.config.completion_timeout(),
            self.config.completion_retries,
        )
        .await?;

        let (level, low_confidence) = parse_grade(&output)?;
        debug!(question_id = %question.id, level = level.as_str(), low_confidence, "open-ended answer graded");

        Ok(GradedAnswer {
            level,
            rationale: output,
            low_confidence,
        })
    }
}

#[async_trait]
impl AssessmentGrader for RubricGrader {
    async fn grade(&self, question: &Question, answer: &str) -> Result<GradedAnswer, GraderError> {
        if question.question_type.is_objective() {
            Ok(self.grade_objective(question, answer))
        } else {
            self.grade_open_ended(question, answer).await
        }
    }
}

/// Lowercase, trim, and collapse inner whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build the grading prompt for an open-ended answer
fn grading_prompt(question: &Question, answer: &str) -> PromptContext {
    let system = "You are a rigorous but kind assessment expert. \
                  Evaluate the student's answer for correctness, depth of \
                  understanding, and clarity. Reply with a line of the form \
                  'Grade: A', 'Grade: B', or 'Grade: C', followed by brief \
                  feedback for the student. \
                  A: fully correct with deep understanding. \
                  B: mostly correct with minor gaps. \
                  C: misunderstands the material.";

    let user = format!(
        "Question ({}):\n{}\n\nRubric / reference answer:\n{}\n{}\n\nStudent answer:\n{}",
        question.question_type.label(),
        question.prompt,
        question.answer_key,
        question.explanation,
        answer,
    );

    PromptContext::system(system).with_message(PromptMessage::user(user))
}

/// Parse a grade letter out of completion output, fail-closed
///
/// Looks for letters following a "grade" marker; falls back to a bare
/// single-letter reply. Ambiguity between distinct levels resolves to the
/// stricter level and flags the result as low-confidence.
fn parse_grade(output: &str) -> Result<(GradeLevel, bool), GraderError> {
    let mut found: Vec<GradeLevel> = Vec::new();

    // Lowercasing can change byte lengths, so the scan stays entirely on the
    // lowercased text; grade letters survive the mapping
    let lower = output.to_lowercase();
    let mut search = lower.as_str();
    while let Some(pos) = search.find("grade") {
        let after = &search[pos + "grade".len()..];
        // First grade letter after the marker, skipping punctuation
        for c in after.chars().take(8) {
            if let Some(level) = GradeLevel::from_letter(c) {
                if !found.contains(&level) {
                    found.push(level);
                }
                break;
            }
            if c.is_alphanumeric() {
                break;
            }
        }
        search = after;
    }

    if found.is_empty() {
        // A bare "A" / "B" / "C" reply still counts
        let trimmed = output.trim();
        if trimmed.len() == 1 {
            if let Some(level) = GradeLevel::from_letter(trimmed.chars().next().unwrap_or(' ')) {
                found.push(level);
            }
        }
    }

    match found.len() {
        0 => Err(GraderError::UnparseableGrade(output.to_string())),
        1 => Ok((found[0], false)),
        _ => {
            let strictest = found
                .iter()
                .copied()
                .fold(GradeLevel::A, GradeLevel::stricter);
            Ok((strictest, true))
        }
    }
}
