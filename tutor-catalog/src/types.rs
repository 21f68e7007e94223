//! Catalog data model: subjects, knowledge items, and questions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject a knowledge item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    LanguageArts,
    Mathematics,
    English,
    History,
    Civics,
}

impl Subject {
    /// Convert to database/JSON string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LanguageArts => "language_arts",
            Self::Mathematics => "mathematics",
            Self::English => "english",
            Self::History => "history",
            Self::Civics => "civics",
        }
    }

    /// Human-readable display name used in prompts and replies
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LanguageArts => "Language Arts",
            Self::Mathematics => "Mathematics",
            Self::English => "English",
            Self::History => "History",
            Self::Civics => "Civics",
        }
    }
}

/// Type of a question
///
/// `Application` questions are the transfer tests: they confirm a student
/// can generalize beyond rote recall, and passing one is the only path to
/// mastery of a knowledge item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    FillBlank,
    Application,
}

impl QuestionType {
    /// Whether this type is graded deterministically against the answer key
    pub fn is_objective(&self) -> bool {
        matches!(
            self,
            Self::MultipleChoice | Self::TrueFalse | Self::FillBlank
        )
    }

    /// Display label for formatted question text
    pub fn label(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple choice",
            Self::TrueFalse => "True or false",
            Self::ShortAnswer => "Short answer",
            Self::FillBlank => "Fill in the blank",
            Self::Application => "Application",
        }
    }
}

/// An atomic teachable unit within a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub subject: Subject,
    pub title: String,
    /// Full instructional content
    pub content: String,
    /// Ordered key points, most fundamental first
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Misconceptions students commonly hold about this item
    #[serde(default)]
    pub common_misconceptions: Vec<String>,
    /// Intuition pumps and hints for the teaching strategy
    #[serde(default)]
    pub teaching_hints: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl KnowledgeItem {
    /// Create a new knowledge item with a generated id
    pub fn new(subject: Subject, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject,
            title: title.into(),
            content: content.into(),
            key_points: Vec::new(),
            common_misconceptions: Vec::new(),
            teaching_hints: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A question with its answer key and rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Owning knowledge item
    pub item_id: String,
    pub question_type: QuestionType,
    /// Difficulty 1-5
    pub difficulty: u8,
    pub prompt: String,
    /// Choices for multiple-choice questions
    #[serde(default)]
    pub choices: Vec<String>,
    /// Answer key for objective types; rubric text for open-ended types
    pub answer_key: String,
    /// Explanation shown to the student after grading
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Create a new question with a generated id
    pub fn new(
        item_id: impl Into<String>,
        question_type: QuestionType,
        difficulty: u8,
        prompt: impl Into<String>,
        answer_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            question_type,
            difficulty,
            prompt: prompt.into(),
            choices: Vec::new(),
            answer_key: answer_key.into(),
            explanation: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Format the question for presentation to the student
    pub fn format(&self) -> String {
        let stars = "*".repeat(self.difficulty.clamp(1, 5) as usize);
        let mut text = format!("[{}] Difficulty: {}\n\n{}\n", self.question_type.label(), stars, self.prompt);
        if !self.choices.is_empty() {
            text.push('\n');
            for choice in &self.choices {
                text.push_str(choice);
                text.push('\n');
            }
        }
        text
    }
}

/// Filters for question bank lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    /// Restrict to a single question type
    pub question_type: Option<QuestionType>,
    /// Drop application (transfer-test) questions
    pub exclude_application: bool,
}

impl QuestionFilter {
    /// Practice questions: everything except transfer tests
    pub fn practice() -> Self {
        Self {
            question_type: None,
            exclude_application: true,
        }
    }

    /// Transfer-test questions only
    pub fn application() -> Self {
        Self {
            question_type: Some(QuestionType::Application),
            exclude_application: false,
        }
    }

    /// Whether a question passes this filter
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(wanted) = self.question_type {
            if question.question_type != wanted {
                return false;
            }
        }
        if self.exclude_application && question.question_type == QuestionType::Application {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Subject Tests ====================

    #[test]
    fn subject_as_str_roundtrips_through_serde() {
        let json = serde_json::to_string(&Subject::LanguageArts).unwrap();
        assert_eq!(json, "\"language_arts\"");
        let parsed: Subject = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Subject::LanguageArts);
    }

    #[test]
    fn subject_display_name_is_human_readable() {
        assert_eq!(Subject::Mathematics.display_name(), "Mathematics");
        assert_eq!(Subject::LanguageArts.display_name(), "Language Arts");
    }

    // ==================== QuestionType Tests ====================

    #[test]
    fn objective_types_are_flagged() {
        assert!(QuestionType::MultipleChoice.is_objective());
        assert!(QuestionType::TrueFalse.is_objective());
        assert!(QuestionType::FillBlank.is_objective());
        assert!(!QuestionType::ShortAnswer.is_objective());
        assert!(!QuestionType::Application.is_objective());
    }

    // ==================== Question Tests ====================

    #[test]
    fn question_format_includes_prompt_and_choices() {
        let mut question = Question::new(
            "item-1",
            QuestionType::MultipleChoice,
            2,
            "Which rhetorical device is used in 'the wind whispered'?",
            "B",
        );
        question.choices = vec![
            "A. Simile".to_string(),
            "B. Personification".to_string(),
        ];

        let text = question.format();
        assert!(text.contains("Multiple choice"));
        assert!(text.contains("the wind whispered"));
        assert!(text.contains("B. Personification"));
        assert!(text.contains("**"));
    }

    #[test]
    fn question_format_clamps_difficulty() {
        let mut question = Question::new("item-1", QuestionType::TrueFalse, 9, "p", "true");
        question.difficulty = 9;
        assert!(question.format().contains("*****"));
    }

    // ==================== QuestionFilter Tests ====================

    #[test]
    fn practice_filter_excludes_application() {
        let filter = QuestionFilter::practice();
        let practice = Question::new("i", QuestionType::MultipleChoice, 1, "p", "A");
        let transfer = Question::new("i", QuestionType::Application, 4, "p", "rubric");

        assert!(filter.matches(&practice));
        assert!(!filter.matches(&transfer));
    }

    #[test]
    fn application_filter_matches_only_application() {
        let filter = QuestionFilter::application();
        let practice = Question::new("i", QuestionType::FillBlank, 1, "p", "x");
        let transfer = Question::new("i", QuestionType::Application, 4, "p", "rubric");

        assert!(!filter.matches(&practice));
        assert!(filter.matches(&transfer));
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = QuestionFilter::default();
        let transfer = Question::new("i", QuestionType::Application, 4, "p", "rubric");
        assert!(filter.matches(&transfer));
    }
}
