//! Event system
//!
//! Discrete events for the observability sink: grading results, remediation
//! triggers, mastery, and session lifecycle, all tagged with session id and
//! timestamp.

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventRecord, EventSeq, MemoryEventBus};
pub use types::TutorEvent;
