//! Consecutive-failure tracking and the remediation flag
//!
//! The tracker is owned by its session, which is the sole writer for its
//! (session, knowledge item) pair; no locking is needed.

use serde::{Deserialize, Serialize};

use crate::grading::GradeLevel;

/// Per (session, knowledge item) consecutive-failure counter
///
/// Invariant: `consecutive_failures` stays in `[0, threshold)`. Reaching the
/// threshold atomically raises the remediation flag and resets the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptTracker {
    threshold: u32,
    consecutive_failures: u32,
    remediation_active: bool,
}

impl AttemptTracker {
    /// Create a tracker with the given failure threshold
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
            remediation_active: false,
        }
    }

    /// Record a graded result
    ///
    /// Returns true only on the call that crosses the threshold; that call
    /// also resets the counter and raises the remediation flag. Any non-C
    /// grade clears the remediation flag; an A also resets the counter,
    /// while a B leaves the counter untouched.
    pub fn record_result(&mut self, level: GradeLevel) -> bool {
        match level {
            GradeLevel::C => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.threshold {
                    self.consecutive_failures = 0;
                    self.remediation_active = true;
                    return true;
                }
                false
            }
            GradeLevel::B => {
                self.remediation_active = false;
                false
            }
            GradeLevel::A => {
                self.consecutive_failures = 0;
                self.remediation_active = false;
                false
            }
        }
    }

    /// Reset on knowledge-item load
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.remediation_active = false;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn remediation_active(&self) -> bool {
        self.remediation_active
    }
}
