//! Event publication
//!
//! The engine publishes an event at each observable step of a turn; sinks
//! decide what to do with them. Sequence numbers are assigned at publish
//! time, so the stream has a total order even when sessions interleave.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use super::TutorEvent;

/// Position of an event in the stream
pub type EventSeq = u64;

/// An event paired with its stream position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: EventSeq,
    pub event: TutorEvent,
}

/// Sink for engine events
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event, returning the sequence number it was assigned
    async fn publish(&self, event: TutorEvent) -> EventSeq;

    /// Live stream of records published from now on
    fn subscribe(&self) -> broadcast::Receiver<EventRecord>;

    /// Every record published for one session, oldest first
    async fn session_events(&self, session_id: &str) -> Vec<EventRecord>;

    /// Sequence number the next publish will receive
    fn current_seq(&self) -> EventSeq;
}

const BROADCAST_CAPACITY: usize = 256;

/// EventBus that keeps the whole stream in memory
///
/// Records land in a log for inspection (tests, per-session audit) and are
/// fanned out to live subscribers over a broadcast channel. A slow
/// subscriber can lag out of the channel window; the log is not affected.
pub struct MemoryEventBus {
    log: RwLock<Vec<EventRecord>>,
    next_seq: AtomicU64,
    tx: broadcast::Sender<EventRecord>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            log: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            tx,
        }
    }

    /// Total number of records published so far
    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.log.read().await.is_empty()
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: TutorEvent) -> EventSeq {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let record = EventRecord { seq, event };

        self.log.write().await.push(record.clone());
        // No live subscribers is fine
        let _ = self.tx.send(record);

        seq
    }

    fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.tx.subscribe()
    }

    async fn session_events(&self, session_id: &str) -> Vec<EventRecord> {
        self.log
            .read()
            .await
            .iter()
            .filter(|record| record.event.session_id() == session_id)
            .cloned()
            .collect()
    }

    fn current_seq(&self) -> EventSeq {
        self.next_seq.load(Ordering::SeqCst)
    }
}
