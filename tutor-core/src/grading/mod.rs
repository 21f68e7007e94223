//! Assessment grading
//!
//! Objective question types are graded deterministically against the answer
//! key; open-ended types go through the completion capability and are parsed
//! fail-closed into one of the three confidence levels.

pub mod grader;
pub mod level;

pub use grader::{AssessmentGrader, RubricGrader};
pub use level::{GradeLevel, GradedAnswer};
