//! Session registry
//!
//! Tracks live sessions and serializes turns per session: each session sits
//! behind its own Mutex, so turns for one session run one at a time while
//! different sessions proceed concurrently. The registry lock is only held
//! long enough to clone the session handle, never across a turn.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use tutor_catalog::Subject;

use super::orchestrator::{Orchestrator, TurnReply};
use super::state::{Session, SessionState};
use crate::error::{SessionError, TutorError};
use crate::events::{EventBus, TutorEvent};

/// Session registry and turn entry point
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    orchestrator: Arc<Orchestrator>,
    events: Arc<dyn EventBus>,
}

impl SessionManager {
    pub fn new(orchestrator: Arc<Orchestrator>, events: Arc<dyn EventBus>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            orchestrator,
            events,
        }
    }

    /// Create a session and return its id with the welcome message
    pub async fn create_session(
        &self,
        student_id: impl Into<String>,
        subject: Subject,
    ) -> (String, String) {
        let config = self.orchestrator.config();
        let session = Session::new(
            student_id,
            subject,
            config.failure_threshold,
            config.history_window,
        );
        let session_id = session.id().to_string();
        let student_id = session.student_id().to_string();

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));

        self.events
            .publish(TutorEvent::SessionCreated {
                session_id: session_id.clone(),
                student_id,
                at: Utc::now(),
            })
            .await;
        info!(session_id = %session_id, subject = subject.as_str(), "session created");

        let welcome = self.orchestrator.welcome(subject).await;
        (session_id, welcome)
    }

    /// Run one turn for a session
    ///
    /// Turns for the same session are serialized; the registry stays
    /// available to other sessions for the whole turn.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        utterance: &str,
    ) -> Result<TurnReply, TutorError> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.lock().await;
        self.orchestrator.handle_turn(&mut session, utterance).await
    }

    /// Point-in-time copy of a session
    pub async fn snapshot(&self, session_id: &str) -> Result<Session, TutorError> {
        let handle = self.session_handle(session_id).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// End a session regardless of its current state
    pub async fn end_session(&self, session_id: &str) -> Result<(), TutorError> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.lock().await;
        if session.request_transition(SessionState::Ended) {
            self.events
                .publish(TutorEvent::SessionStateChanged {
                    session_id: session_id.to_string(),
                    state: SessionState::Ended.as_str().to_string(),
                    at: Utc::now(),
                })
                .await;
            info!(session_id = %session_id, "session ended");
        }
        Ok(())
    }

    /// Drop ended sessions from the registry, returning how many were removed
    pub async fn prune_ended(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut ended = Vec::new();
        for (id, handle) in sessions.iter() {
            if handle.lock().await.state() == SessionState::Ended {
                ended.push(id.clone());
            }
        }
        for id in &ended {
            sessions.remove(id);
        }
        ended.len()
    }

    /// Ids of all registered sessions
    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    async fn session_handle(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }
}
