//! Intent classification
//!
//! Maps a raw utterance to an intent using configurable trigger-phrase sets.
//! Classification is advisory: the orchestrator only acts on an intent where
//! the state machine allows the transition.

use serde::{Deserialize, Serialize};

use crate::config::TutorConfig;
use crate::session::SessionState;

/// Intent resolved from a user utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Student asked to practice
    StartPractice,
    /// Student asked for a hint on the current question
    RequestHint,
    /// Student asked to end the session
    Exit,
    /// Everything else: teaching continuation or a free-form answer
    Continue,
}

/// Trigger-phrase intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    practice_triggers: Vec<String>,
    hint_triggers: Vec<String>,
    exit_triggers: Vec<String>,
}

impl IntentClassifier {
    /// Build a classifier from the configured phrase sets
    pub fn from_config(config: &TutorConfig) -> Self {
        Self {
            practice_triggers: lowercased(&config.practice_triggers),
            hint_triggers: lowercased(&config.hint_triggers),
            exit_triggers: lowercased(&config.exit_triggers),
        }
    }

    /// Classify an utterance in the context of the current state
    ///
    /// Exit wins over everything. Hint triggers only apply while a question
    /// is pending, so "hint" inside a Teaching chat stays free-form.
    pub fn classify(&self, utterance: &str, state: SessionState) -> Intent {
        let text = utterance.to_lowercase();

        if matches_any(&text, &self.exit_triggers) {
            return Intent::Exit;
        }

        let question_pending = matches!(
            state,
            SessionState::Practicing | SessionState::TransferTesting
        );
        if question_pending && matches_any(&text, &self.hint_triggers) {
            return Intent::RequestHint;
        }

        if matches_any(&text, &self.practice_triggers) {
            return Intent::StartPractice;
        }

        Intent::Continue
    }
}

fn lowercased(phrases: &[String]) -> Vec<String> {
    phrases.iter().map(|p| p.to_lowercase()).collect()
}

fn matches_any(text: &str, triggers: &[String]) -> bool {
    triggers.iter().any(|t| !t.is_empty() && text.contains(t))
}
