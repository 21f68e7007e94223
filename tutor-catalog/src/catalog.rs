//! KnowledgeCatalog trait and in-memory implementation
//!
//! The catalog is read-mostly: the learning engine only ever looks items and
//! questions up. MemoryCatalog keeps both banks behind RwLocks so concurrent
//! sessions can read without coordination.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CatalogError;
use crate::types::{KnowledgeItem, Question, QuestionFilter, Subject};

/// Read-only catalog access as seen by the learning engine
#[async_trait]
pub trait KnowledgeCatalog: Send + Sync {
    /// List knowledge items for a subject
    async fn list_items(&self, subject: Subject) -> Vec<KnowledgeItem>;

    /// Look up a knowledge item by id
    async fn get_item(&self, id: &str) -> Result<KnowledgeItem, CatalogError>;

    /// List questions owned by a knowledge item, applying the filter
    async fn list_questions(&self, item_id: &str, filter: QuestionFilter) -> Vec<Question>;

    /// Look up a question by id
    async fn get_question(&self, id: &str) -> Result<Question, CatalogError>;
}

/// In-memory implementation of KnowledgeCatalog
pub struct MemoryCatalog {
    items: RwLock<HashMap<String, KnowledgeItem>>,
    questions: RwLock<HashMap<String, Question>>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            questions: RwLock::new(HashMap::new()),
        }
    }

    /// Add a knowledge item (administrative path, not used by the engine)
    pub async fn add_item(&self, item: KnowledgeItem) {
        self.items.write().await.insert(item.id.clone(), item);
    }

    /// Add a question (administrative path, not used by the engine)
    pub async fn add_question(&self, question: Question) {
        self.questions
            .write()
            .await
            .insert(question.id.clone(), question);
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeCatalog for MemoryCatalog {
    async fn list_items(&self, subject: Subject) -> Vec<KnowledgeItem> {
        let mut items: Vec<_> = self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.subject == subject)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.title.cmp(&b.title));
        items
    }

    async fn get_item(&self, id: &str) -> Result<KnowledgeItem, CatalogError> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))
    }

    async fn list_questions(&self, item_id: &str, filter: QuestionFilter) -> Vec<Question> {
        let mut questions: Vec<_> = self
            .questions
            .read()
            .await
            .values()
            .filter(|q| q.item_id == item_id && filter.matches(q))
            .cloned()
            .collect();
        // Stable order: easiest first, ties broken by id
        questions.sort_by(|a, b| a.difficulty.cmp(&b.difficulty).then(a.id.cmp(&b.id)));
        questions
    }

    async fn get_question(&self, id: &str) -> Result<Question, CatalogError> {
        self.questions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::QuestionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionType;

    async fn seeded_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new();

        let mut item = KnowledgeItem::new(
            Subject::Mathematics,
            "Quadratic equations",
            "How to solve ax^2 + bx + c = 0",
        );
        item.id = "math-quadratic".to_string();
        catalog.add_item(item).await;

        let mut q1 = Question::new(
            "math-quadratic",
            QuestionType::MultipleChoice,
            2,
            "Solutions of x^2 - 5x + 6 = 0?",
            "A",
        );
        q1.id = "q-choice".to_string();
        catalog.add_question(q1).await;

        let mut q2 = Question::new(
            "math-quadratic",
            QuestionType::Application,
            4,
            "A rectangle is 3m longer than wide with area 40. Find its sides.",
            "width 5, length 8",
        );
        q2.id = "q-transfer".to_string();
        catalog.add_question(q2).await;

        catalog
    }

    // ==================== Item Tests ====================

    #[tokio::test]
    async fn list_items_filters_by_subject() {
        let catalog = seeded_catalog().await;

        let math = catalog.list_items(Subject::Mathematics).await;
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].id, "math-quadratic");

        let history = catalog.list_items(Subject::History).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn get_item_returns_item() {
        let catalog = seeded_catalog().await;
        let item = catalog.get_item("math-quadratic").await.unwrap();
        assert_eq!(item.title, "Quadratic equations");
    }

    #[tokio::test]
    async fn get_item_unknown_id_signals_not_found() {
        let catalog = seeded_catalog().await;
        let result = catalog.get_item("nope").await;
        assert!(matches!(result, Err(CatalogError::ItemNotFound(_))));
    }

    // ==================== Question Tests ====================

    #[tokio::test]
    async fn list_questions_practice_filter_drops_transfer() {
        let catalog = seeded_catalog().await;
        let questions = catalog
            .list_questions("math-quadratic", QuestionFilter::practice())
            .await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "q-choice");
    }

    #[tokio::test]
    async fn list_questions_application_filter_keeps_only_transfer() {
        let catalog = seeded_catalog().await;
        let questions = catalog
            .list_questions("math-quadratic", QuestionFilter::application())
            .await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "q-transfer");
    }

    #[tokio::test]
    async fn list_questions_sorted_by_difficulty_then_id() {
        let catalog = seeded_catalog().await;
        let questions = catalog
            .list_questions("math-quadratic", QuestionFilter::default())
            .await;
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "q-choice");
        assert_eq!(questions[1].id, "q-transfer");
    }

    #[tokio::test]
    async fn get_question_unknown_id_signals_not_found() {
        let catalog = seeded_catalog().await;
        let result = catalog.get_question("nope").await;
        assert!(matches!(result, Err(CatalogError::QuestionNotFound(_))));
    }
}
