//! Error types for tutor-catalog

use thiserror::Error;

/// Errors from catalog lookups
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Knowledge item not found: {0}")]
    ItemNotFound(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_not_found_displays_id() {
        let error = CatalogError::ItemNotFound("ki-42".to_string());
        assert!(error.to_string().contains("Knowledge item not found"));
        assert!(error.to_string().contains("ki-42"));
    }

    #[test]
    fn question_not_found_displays_id() {
        let error = CatalogError::QuestionNotFound("q-7".to_string());
        assert!(error.to_string().contains("Question not found"));
        assert!(error.to_string().contains("q-7"));
    }
}
