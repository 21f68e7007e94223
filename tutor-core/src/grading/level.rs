//! Grade levels and graded answers

use serde::{Deserialize, Serialize};

/// Confidence level assigned to a graded answer
///
/// A: deep understanding, ready for the transfer test.
/// B: basic understanding, more practice needed.
/// C: insufficient understanding, re-teach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    A,
    B,
    C,
}

impl GradeLevel {
    /// Ordering rank: higher is better
    fn rank(&self) -> u8 {
        match self {
            Self::A => 2,
            Self::B => 1,
            Self::C => 0,
        }
    }

    /// The stricter of two levels (used for ambiguity tie-breaks)
    pub fn stricter(self, other: Self) -> Self {
        if self.rank() <= other.rank() { self } else { other }
    }

    /// Parse a single grade letter
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// Result of grading one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub level: GradeLevel,
    /// Why the grade was assigned; shown to the student as feedback
    pub rationale: String,
    /// Set when an ambiguous open-ended grade was resolved to the stricter level
    #[serde(default)]
    pub low_confidence: bool,
}

impl GradedAnswer {
    pub fn new(level: GradeLevel, rationale: impl Into<String>) -> Self {
        Self {
            level,
            rationale: rationale.into(),
            low_confidence: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stricter_picks_the_lower_level() {
        assert_eq!(GradeLevel::A.stricter(GradeLevel::B), GradeLevel::B);
        assert_eq!(GradeLevel::B.stricter(GradeLevel::C), GradeLevel::C);
        assert_eq!(GradeLevel::A.stricter(GradeLevel::A), GradeLevel::A);
    }

    #[test]
    fn from_letter_accepts_both_cases() {
        assert_eq!(GradeLevel::from_letter('a'), Some(GradeLevel::A));
        assert_eq!(GradeLevel::from_letter('B'), Some(GradeLevel::B));
        assert_eq!(GradeLevel::from_letter('x'), None);
    }

    #[test]
    fn grade_level_serializes_as_bare_letter() {
        assert_eq!(serde_json::to_string(&GradeLevel::A).unwrap(), "\"A\"");
        let parsed: GradeLevel = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(parsed, GradeLevel::C);
    }
}
