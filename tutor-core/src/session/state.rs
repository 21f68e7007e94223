//! Session struct and state machine
//!
//! Session is pure data plus the transition guard: it never talks to
//! collaborators itself. All transitions go through the orchestrator, and
//! invalid transition requests are rejected as no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tutor_catalog::Subject;

use crate::completion::PromptMessage;
use crate::tracker::AttemptTracker;

/// State of a learning session
///
/// `Evaluating` and `Remediating` are transient: a turn passes through them
/// and lands on the next durable state before returning. `Mastered` is
/// terminal for the current knowledge item; the next turn re-enters
/// `Selecting`. `Ended` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Choosing a knowledge item
    Selecting,
    /// Instructional conversation on the current item
    Teaching,
    /// A practice question is pending an answer
    Practicing,
    /// An answer is being graded
    Evaluating,
    /// An application question is pending an answer
    TransferTesting,
    /// Simplified re-teaching after repeated failure
    Remediating,
    /// The current item was mastered
    Mastered,
    /// The session is over
    Ended,
}

impl SessionState {
    /// String form used in state-change events
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selecting => "selecting",
            Self::Teaching => "teaching",
            Self::Practicing => "practicing",
            Self::Evaluating => "evaluating",
            Self::TransferTesting => "transfer_testing",
            Self::Remediating => "remediating",
            Self::Mastered => "mastered",
            Self::Ended => "ended",
        }
    }

    /// Whether the state machine allows `from -> to`
    pub fn allows(from: SessionState, to: SessionState) -> bool {
        use SessionState::*;
        if from == Ended {
            return false;
        }
        // Explicit exit is allowed from any live state
        if to == Ended {
            return true;
        }
        matches!(
            (from, to),
            (Selecting, Teaching)
                | (Teaching, Practicing)
                | (Practicing, Evaluating)
                | (TransferTesting, Evaluating)
                | (Evaluating, TransferTesting)
                | (Evaluating, Mastered)
                | (Evaluating, Teaching)
                | (Evaluating, Remediating)
                | (Remediating, Teaching)
                | (Mastered, Selecting)
                // Catalog-miss fallback: drop back to re-selection
                | (Teaching, Selecting)
                | (Practicing, Selecting)
                | (TransferTesting, Selecting)
        )
    }
}

/// A learning session: one student working through one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    student_id: String,
    subject: Subject,
    /// Knowledge item currently being worked on
    item_id: Option<String>,
    /// Question currently pending an answer
    question_id: Option<String>,
    state: SessionState,
    tracker: AttemptTracker,
    /// Bounded conversation window for teaching context
    history: Vec<PromptMessage>,
    history_window: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session in Selecting state
    pub fn new(
        student_id: impl Into<String>,
        subject: Subject,
        failure_threshold: u32,
        history_window: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.into(),
            subject,
            item_id: None,
            question_id: None,
            state: SessionState::Selecting,
            tracker: AttemptTracker::new(failure_threshold),
            history: Vec::new(),
            history_window,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn question_id(&self) -> Option<&str> {
        self.question_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.tracker.consecutive_failures()
    }

    pub fn remediation_active(&self) -> bool {
        self.tracker.remediation_active()
    }

    pub fn history(&self) -> &[PromptMessage] {
        &self.history
    }

    /// Request a state transition
    ///
    /// Invalid requests are rejected as no-ops: the state is left unchanged
    /// and `false` is returned, never a coerced transition.
    pub fn request_transition(&mut self, to: SessionState) -> bool {
        if SessionState::allows(self.state, to) {
            self.state = to;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut AttemptTracker {
        &mut self.tracker
    }

    pub(crate) fn set_item(&mut self, item_id: Option<String>) {
        self.item_id = item_id;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_question(&mut self, question_id: Option<String>) {
        self.question_id = question_id;
        self.updated_at = Utc::now();
    }

    /// Append a message to the bounded history window
    pub(crate) fn push_history(&mut self, message: PromptMessage) {
        self.history.push(message);
        if self.history.len() > self.history_window {
            let excess = self.history.len() - self.history_window;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("student-1", Subject::Mathematics, 3, 10)
    }

    // ==================== Creation Tests ====================

    #[test]
    fn new_session_starts_in_selecting() {
        let session = session();
        assert_eq!(session.state(), SessionState::Selecting);
        assert!(session.item_id().is_none());
        assert!(session.question_id().is_none());
        assert_eq!(session.consecutive_failures(), 0);
        assert!(!session.remediation_active());
    }

    #[test]
    fn new_sessions_get_unique_ids() {
        assert_ne!(session().id(), session().id());
    }

    // ==================== Transition Tests ====================

    #[test]
    fn valid_transitions_are_accepted() {
        let mut s = session();
        assert!(s.request_transition(SessionState::Teaching));
        assert!(s.request_transition(SessionState::Practicing));
        assert!(s.request_transition(SessionState::Evaluating));
        assert!(s.request_transition(SessionState::TransferTesting));
        assert_eq!(s.state(), SessionState::TransferTesting);
    }

    #[test]
    fn invalid_transition_is_a_pure_no_op() {
        let mut s = session();
        s.request_transition(SessionState::Teaching);

        // Requesting TransferTesting while Teaching must be rejected
        let before = s.state();
        assert!(!s.request_transition(SessionState::TransferTesting));
        assert_eq!(s.state(), before);
    }

    #[test]
    fn exit_is_allowed_from_any_live_state() {
        for state in [
            SessionState::Selecting,
            SessionState::Teaching,
            SessionState::Practicing,
            SessionState::TransferTesting,
            SessionState::Mastered,
        ] {
            assert!(SessionState::allows(state, SessionState::Ended));
        }
    }

    #[test]
    fn ended_is_terminal() {
        let mut s = session();
        assert!(s.request_transition(SessionState::Ended));
        assert!(!s.request_transition(SessionState::Selecting));
        assert!(!s.request_transition(SessionState::Ended));
        assert_eq!(s.state(), SessionState::Ended);
    }

    #[test]
    fn mastered_reenters_selecting_only() {
        assert!(SessionState::allows(
            SessionState::Mastered,
            SessionState::Selecting
        ));
        assert!(!SessionState::allows(
            SessionState::Mastered,
            SessionState::Teaching
        ));
    }

    #[test]
    fn remediating_returns_to_teaching() {
        assert!(SessionState::allows(
            SessionState::Remediating,
            SessionState::Teaching
        ));
        assert!(!SessionState::allows(
            SessionState::Remediating,
            SessionState::Practicing
        ));
    }

    // ==================== History Tests ====================

    #[test]
    fn history_is_bounded_to_window() {
        let mut s = Session::new("stu", Subject::English, 3, 4);
        for i in 0..10 {
            s.push_history(PromptMessage::user(format!("message {}", i)));
        }
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.history()[0].content, "message 6");
        assert_eq!(s.history()[3].content, "message 9");
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn session_state_serialization_roundtrip() {
        let states = [
            SessionState::Selecting,
            SessionState::Teaching,
            SessionState::Practicing,
            SessionState::Evaluating,
            SessionState::TransferTesting,
            SessionState::Remediating,
            SessionState::Mastered,
            SessionState::Ended,
        ];
        for state in states {
            let json = serde_json::to_string(&state).unwrap();
            let parsed: SessionState = serde_json::from_str(&json).unwrap();
            assert_eq!(state, parsed);
        }
    }
}
