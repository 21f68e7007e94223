//! Error types for tutor-core

use thiserror::Error;

use tutor_catalog::CatalogError;

/// Top-level error type for tutor-core
#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Grader error: {0}")]
    Grader(#[from] GraderError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors related to session management
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session has ended")]
    Ended,
}

/// Errors from the completion capability (the model channel)
///
/// These are channel failures, never student failures: the orchestrator
/// treats them as retryable and they must not count against the student.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Completion call timed out")]
    Timeout,

    #[error("Completion capability unavailable: {0}")]
    Unavailable(String),

    #[error("Completion returned malformed output: {0}")]
    MalformedOutput(String),
}

/// Errors from assessment grading
#[derive(Error, Debug)]
pub enum GraderError {
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Grader output did not contain exactly one of A/B/C
    #[error("Grade not parseable from completion output: {0}")]
    UnparseableGrade(String),
}

/// Errors from the mastery ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger storage error: {0}")]
    Storage(String),
}
