//! Field-level predicates.
//!
//! A [`Predicate`] is one field comparison: a field name, an [`Op`], an
//! operand and an optional relevance boost. Constructors validate their
//! input, so a predicate that exists is well formed.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::value::Value;

/// Operand of a predicate: one value, or an ordered `(lower, upper)` pair
/// for [`Op::Range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Single(Value),
    Range { lower: Value, upper: Value },
}

/// A single field comparison.
///
/// # Example
///
/// ```
/// use quarry::{Op, Predicate};
///
/// let title = Predicate::equals("title", "important")?.with_boost(2.0)?;
/// assert_eq!(title.op(), Op::Equals);
/// assert_eq!(title.effective_boost(), Some(2.0));
///
/// let likes = Predicate::compare("likes", Op::GreaterThan, 50)?;
/// assert_eq!(likes.effective_boost(), None);
/// # Ok::<(), quarry::QueryError>(())
/// ```
///
/// Deserialization runs the same checks as the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredicate")]
pub struct Predicate {
    field: String,
    op: Op,
    operand: Operand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
}

impl Predicate {
    /// Creates an equality (full-text match) predicate.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Predicate::compare(field, Op::Equals, value)
    }

    /// Creates a single-operand predicate.
    ///
    /// [`Op::Range`] needs two bounds; use [`Predicate::range`] for it. Passing
    /// it here builds the degenerate range `[value TO value]`.
    pub fn compare(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Result<Self> {
        let field = checked_field(field.into())?;
        let value = value.into();
        value.validate(&field)?;
        let operand = match op {
            Op::Range => Operand::Range {
                lower: value.clone(),
                upper: value,
            },
            _ => Operand::Single(value),
        };
        Ok(Predicate {
            field,
            op,
            operand,
            boost: None,
        })
    }

    /// Creates an inclusive range predicate.
    ///
    /// Fails with [`QueryError::InvertedRange`] when both bounds have a known
    /// order and `lower` is above `upper`.
    pub fn range(
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Result<Self> {
        let field = checked_field(field.into())?;
        let (lower, upper) = (lower.into(), upper.into());
        lower.validate(&field)?;
        upper.validate(&field)?;
        if lower.compare(&upper) == Some(std::cmp::Ordering::Greater) {
            return Err(QueryError::InvertedRange { field });
        }
        Ok(Predicate {
            field,
            op: Op::Range,
            operand: Operand::Range { lower, upper },
            boost: None,
        })
    }

    /// Returns this predicate with a relevance boost attached.
    pub fn with_boost(mut self, weight: f64) -> Result<Self> {
        self.set_boost(weight)?;
        Ok(self)
    }

    /// Sets the relevance boost in place.
    ///
    /// The weight must be positive and finite, and only [`Op::Equals`]
    /// predicates rank.
    pub fn set_boost(&mut self, weight: f64) -> Result<()> {
        if !self.op.accepts_boost() {
            return Err(QueryError::BoostNotAllowed {
                field: self.field.clone(),
                op: self.op.as_str(),
            });
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(QueryError::InvalidBoost {
                field: self.field.clone(),
                weight,
            });
        }
        self.boost = Some(weight);
        Ok(())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Returns the boost as set, including a neutral `1.0`.
    pub fn boost(&self) -> Option<f64> {
        self.boost
    }

    /// Returns the boost a serializer should emit: `None` when unset or `1.0`.
    #[allow(clippy::float_cmp)]
    pub fn effective_boost(&self) -> Option<f64> {
        self.boost.filter(|b| *b != 1.0)
    }
}

/// Unchecked wire shape of a [`Predicate`].
#[derive(Deserialize)]
struct RawPredicate {
    field: String,
    op: Op,
    operand: Operand,
    #[serde(default)]
    boost: Option<f64>,
}

impl TryFrom<RawPredicate> for Predicate {
    type Error = QueryError;

    fn try_from(raw: RawPredicate) -> Result<Self> {
        let mut predicate = match (raw.op, raw.operand) {
            (Op::Range, Operand::Range { lower, upper }) => {
                Predicate::range(raw.field, lower, upper)?
            }
            (op, Operand::Single(value)) => Predicate::compare(raw.field, op, value)?,
            (op, Operand::Range { .. }) => {
                return Err(QueryError::OperandMismatch {
                    field: raw.field,
                    op: op.as_str(),
                })
            }
        };
        if let Some(weight) = raw.boost {
            predicate.set_boost(weight)?;
        }
        Ok(predicate)
    }
}

fn checked_field(field: String) -> Result<String> {
    if field.trim().is_empty() {
        tracing::debug!("rejected empty field name");
        return Err(QueryError::EmptyField);
    }
    Ok(field)
}
