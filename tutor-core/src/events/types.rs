//! Event type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::GradeLevel;

/// Events emitted by the learning engine
///
/// Every variant carries the originating session id and a UTC timestamp so
/// an external sink can correlate and order them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorEvent {
    /// A new session was created
    SessionCreated {
        session_id: String,
        student_id: String,
        at: DateTime<Utc>,
    },

    /// Session state changed
    SessionStateChanged {
        session_id: String,
        state: String,
        at: DateTime<Utc>,
    },

    /// An answer was graded and an attempt recorded
    Graded {
        session_id: String,
        question_id: String,
        level: GradeLevel,
        at: DateTime<Utc>,
    },

    /// The consecutive-failure threshold was crossed
    RemediationTriggered {
        session_id: String,
        item_id: String,
        at: DateTime<Utc>,
    },

    /// A knowledge item was mastered
    Mastered {
        session_id: String,
        item_id: String,
        at: DateTime<Utc>,
    },

    /// A turn failed without changing session state (channel failure)
    TurnFailed {
        session_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl TutorEvent {
    /// The session this event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionCreated { session_id, .. }
            | Self::SessionStateChanged { session_id, .. }
            | Self::Graded { session_id, .. }
            | Self::RemediationTriggered { session_id, .. }
            | Self::Mastered { session_id, .. }
            | Self::TurnFailed { session_id, .. } => session_id,
        }
    }

    /// Timestamp of the event
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::SessionCreated { at, .. }
            | Self::SessionStateChanged { at, .. }
            | Self::Graded { at, .. }
            | Self::RemediationTriggered { at, .. }
            | Self::Mastered { at, .. }
            | Self::TurnFailed { at, .. } => *at,
        }
    }
}
