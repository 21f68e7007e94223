//! Engine configuration
//!
//! All thresholds the learning loop depends on live here rather than as
//! hardcoded constants: the consecutive-failure threshold, the fill-blank
//! partial-match threshold, the completion timeout/retry policy, and the
//! trigger-phrase sets used by intent classification.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the learning engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TutorConfig {
    /// Consecutive C grades that trigger remediation
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Keyword overlap ratio for a fill-blank answer to earn a B
    #[serde(default = "default_partial_match_threshold")]
    pub partial_match_threshold: f64,

    /// Deadline for a single completion call, in seconds
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,

    /// Retries after a failed completion call before the turn fails soft
    #[serde(default = "default_completion_retries")]
    pub completion_retries: u32,

    /// Prompt messages of history kept for teaching context
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Phrases that classify as a practice request
    #[serde(default = "default_practice_triggers")]
    pub practice_triggers: Vec<String>,

    /// Phrases that classify as a hint request
    #[serde(default = "default_hint_triggers")]
    pub hint_triggers: Vec<String>,

    /// Phrases that classify as an explicit exit
    #[serde(default = "default_exit_triggers")]
    pub exit_triggers: Vec<String>,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_partial_match_threshold() -> f64 {
    0.5
}

fn default_completion_timeout_secs() -> u64 {
    30
}

fn default_completion_retries() -> u32 {
    1
}

fn default_history_window() -> usize {
    10
}

fn default_practice_triggers() -> Vec<String> {
    ["practice", "quiz", "test me", "give me a question", "exercise"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_hint_triggers() -> Vec<String> {
    ["hint", "give me a hint", "i'm stuck", "how do i start"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exit_triggers() -> Vec<String> {
    ["exit", "quit", "goodbye", "stop session"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            partial_match_threshold: default_partial_match_threshold(),
            completion_timeout_secs: default_completion_timeout_secs(),
            completion_retries: default_completion_retries(),
            history_window: default_history_window(),
            practice_triggers: default_practice_triggers(),
            hint_triggers: default_hint_triggers(),
            exit_triggers: default_exit_triggers(),
        }
    }
}

impl TutorConfig {
    /// Parse a config from TOML, filling unset fields with defaults
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Completion deadline as a Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_constants() {
        let config = TutorConfig::default();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.partial_match_threshold, 0.5);
        assert_eq!(config.history_window, 10);
        assert!(config.completion_retries >= 1);
    }

    #[test]
    fn from_toml_overrides_selected_fields() {
        let config = TutorConfig::from_toml(
            r#"
            failure_threshold = 2
            completion_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.failure_threshold, 2);
        assert_eq!(config.completion_timeout(), Duration::from_secs(5));
        // Unset fields keep defaults
        assert_eq!(config.history_window, 10);
        assert!(!config.practice_triggers.is_empty());
    }

    #[test]
    fn from_toml_empty_is_default() {
        let config = TutorConfig::from_toml("").unwrap();
        assert_eq!(config, TutorConfig::default());
    }

    #[test]
    fn from_toml_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutor.toml");
        std::fs::write(&path, "failure_threshold = 4\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config = TutorConfig::from_toml(&text).unwrap();
        assert_eq!(config.failure_threshold, 4);
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = TutorConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = TutorConfig::from_toml(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
