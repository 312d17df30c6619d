//! Comparison operators for predicates.
//!
//! The builder exposes `matches`, `gt`, `gte`, `lte` and `between`; there is
//! deliberately no strict less-than.

use serde::{Deserialize, Serialize};

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Full-text match / equality. The only operator that takes a boost.
    Equals,
    /// Strictly greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterOrEqual,
    /// Less than or equal.
    LessOrEqual,
    /// Inclusive range between an ordered lower and upper bound.
    Range,
}

impl Op {
    /// Returns `true` if a relevance boost may be attached.
    pub fn accepts_boost(self) -> bool {
        matches!(self, Op::Equals)
    }

    /// Returns `true` for operators rendered with range syntax.
    pub fn is_range(self) -> bool {
        !matches!(self, Op::Equals)
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Equals => "eq",
            Op::GreaterThan => "gt",
            Op::GreaterOrEqual => "gte",
            Op::LessOrEqual => "lte",
            Op::Range => "range",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_only_on_equals() {
        assert!(Op::Equals.accepts_boost());
        assert!(!Op::GreaterThan.accepts_boost());
        assert!(!Op::GreaterOrEqual.accepts_boost());
        assert!(!Op::LessOrEqual.accepts_boost());
        assert!(!Op::Range.accepts_boost());
    }

    #[test]
    fn range_ops() {
        assert!(!Op::Equals.is_range());
        assert!(Op::GreaterThan.is_range());
        assert!(Op::Range.is_range());
    }

    #[test]
    fn op_display() {
        assert_eq!(Op::Equals.to_string(), "eq");
        assert_eq!(Op::GreaterOrEqual.to_string(), "gte");
        assert_eq!(Op::Range.to_string(), "range");
    }
}
