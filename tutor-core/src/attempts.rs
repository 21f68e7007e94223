//! Append-only attempt store
//!
//! One Attempt is written per graded answer, never mutated afterwards.
//! Grading-channel failures write nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::grading::GradeLevel;

/// A graded answer, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub answer: String,
    pub level: GradeLevel,
    /// Set when an ambiguous open-ended grade was resolved to the stricter level
    #[serde(default)]
    pub low_confidence: bool,
    pub at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        session_id: impl Into<String>,
        question_id: impl Into<String>,
        answer: impl Into<String>,
        level: GradeLevel,
        low_confidence: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            question_id: question_id.into(),
            answer: answer.into(),
            level,
            low_confidence,
            at: Utc::now(),
        }
    }
}

/// Consumed interface for attempt persistence
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Append an attempt
    async fn record(&self, attempt: Attempt);

    /// All attempts for a session, in insertion order
    async fn for_session(&self, session_id: &str) -> Vec<Attempt>;
}

/// In-memory implementation of AttemptStore
pub struct MemoryAttemptStore {
    attempts: RwLock<Vec<Attempt>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self {
            attempts: RwLock::new(Vec::new()),
        }
    }

    /// Total number of stored attempts
    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.attempts.read().await.is_empty()
    }
}

impl Default for MemoryAttemptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn record(&self, attempt: Attempt) {
        self.attempts.write().await.push(attempt);
    }

    async fn for_session(&self, session_id: &str) -> Vec<Attempt> {
        self.attempts
            .read()
            .await
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect()
    }
}
