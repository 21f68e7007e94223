//! Mastery ledger
//!
//! Per (student, knowledge item) mastery records, persisted independently of
//! sessions. The orchestrator is the only caller that sets `mastered = true`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::LedgerError;

/// Mastery state of one student on one knowledge item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub student_id: String,
    pub item_id: String,
    pub mastered: bool,
    pub mastered_at: Option<DateTime<Utc>>,
}

/// Consumed interface for mastery persistence
///
/// Concurrent upserts for the same (student, item) key must be serialized by
/// the implementation; last writer wins, no partial writes.
#[async_trait]
pub trait MasteryLedger: Send + Sync {
    /// Look up the record for a (student, item) pair
    async fn get(&self, student_id: &str, item_id: &str) -> Option<MasteryRecord>;

    /// Create or replace the record for a (student, item) pair
    async fn upsert(&self, record: MasteryRecord) -> Result<(), LedgerError>;
}

/// In-memory implementation of MasteryLedger
///
/// The single write lock serializes upserts across all keys, which is
/// stricter than the per-key requirement.
pub struct MemoryMasteryLedger {
    records: RwLock<HashMap<(String, String), MasteryRecord>>,
}

impl MemoryMasteryLedger {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryMasteryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MasteryLedger for MemoryMasteryLedger {
    async fn get(&self, student_id: &str, item_id: &str) -> Option<MasteryRecord> {
        self.records
            .read()
            .await
            .get(&(student_id.to_string(), item_id.to_string()))
            .cloned()
    }

    async fn upsert(&self, record: MasteryRecord) -> Result<(), LedgerError> {
        let key = (record.student_id.clone(), record.item_id.clone());
        self.records.write().await.insert(key, record);
        Ok(())
    }
}
