//! Relative date expressions.
//!
//! A [`DateMath`] is a base instant plus an optional signed offset in one
//! [`DateUnit`]. Offsets are built with [`minus`] and [`plus`] and folded
//! into a base with [`DateMath::now`] or [`DateMath::anchored`]:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use quarry::datemath::{minus, months, DateMath};
//!
//! let instant = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
//! let month_ago = DateMath::now(instant, Some(minus(1, months())?));
//!
//! assert_eq!(month_ago.offset().map(|o| o.amount()), Some(-1));
//! # Ok::<(), quarry::QueryError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Unit of a date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl DateUnit {
    /// All units, smallest first.
    pub const ALL: [DateUnit; 6] = [
        DateUnit::Seconds,
        DateUnit::Minutes,
        DateUnit::Hours,
        DateUnit::Days,
        DateUnit::Months,
        DateUnit::Years,
    ];

    /// Returns the tag name of this unit.
    pub fn as_str(self) -> &'static str {
        match self {
            DateUnit::Seconds => "seconds",
            DateUnit::Minutes => "minutes",
            DateUnit::Hours => "hours",
            DateUnit::Days => "days",
            DateUnit::Months => "months",
            DateUnit::Years => "years",
        }
    }
}

impl fmt::Display for DateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateUnit {
    type Err = QueryError;

    /// Parses a unit tag. Singular forms and any casing are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        let plural = if tag.ends_with('s') {
            tag.clone()
        } else {
            format!("{tag}s")
        };
        DateUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == plural)
            .ok_or_else(|| QueryError::UnknownUnit(s.to_string()))
    }
}

pub fn seconds() -> DateUnit {
    DateUnit::Seconds
}

pub fn minutes() -> DateUnit {
    DateUnit::Minutes
}

pub fn hours() -> DateUnit {
    DateUnit::Hours
}

pub fn days() -> DateUnit {
    DateUnit::Days
}

pub fn months() -> DateUnit {
    DateUnit::Months
}

pub fn years() -> DateUnit {
    DateUnit::Years
}

/// Signed offset in a single unit. Negative amounts point into the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateOffset {
    amount: i64,
    unit: DateUnit,
}

impl DateOffset {
    pub fn amount(self) -> i64 {
        self.amount
    }

    pub fn unit(self) -> DateUnit {
        self.unit
    }

    pub fn is_zero(self) -> bool {
        self.amount == 0
    }
}

/// Builds an offset of `amount` units into the past.
///
/// Fails with [`QueryError::NegativeOffset`] when `amount` is negative.
pub fn minus(amount: i64, unit: DateUnit) -> Result<DateOffset> {
    check_amount(amount)?;
    Ok(DateOffset {
        amount: -amount,
        unit,
    })
}

/// Builds an offset of `amount` units into the future.
pub fn plus(amount: i64, unit: DateUnit) -> Result<DateOffset> {
    check_amount(amount)?;
    Ok(DateOffset { amount, unit })
}

fn check_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        tracing::debug!(amount, "rejected negative date offset");
        return Err(QueryError::NegativeOffset { amount });
    }
    Ok(())
}

/// Instant a date math expression is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBase {
    /// "Now", captured once when the expression was built.
    Now(DateTime<Utc>),
    /// Explicit date literal.
    Literal(DateTime<Utc>),
}

impl DateBase {
    /// The instant this base stands for.
    pub fn instant(self) -> DateTime<Utc> {
        match self {
            DateBase::Now(t) | DateBase::Literal(t) => t,
        }
    }
}

/// Relative date: a base plus at most one compound offset.
///
/// A zero offset is dropped on construction, so the expression collapses to
/// its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMath {
    base: DateBase,
    offset: Option<DateOffset>,
}

impl DateMath {
    /// Anchors `offset` at the captured instant `now`.
    pub fn now(now: DateTime<Utc>, offset: Option<DateOffset>) -> Self {
        DateMath::new(DateBase::Now(now), offset)
    }

    /// Anchors `offset` at an explicit date literal.
    pub fn anchored(literal: DateTime<Utc>, offset: DateOffset) -> Self {
        DateMath::new(DateBase::Literal(literal), Some(offset))
    }

    fn new(base: DateBase, offset: Option<DateOffset>) -> Self {
        DateMath {
            base,
            offset: offset.filter(|o| !o.is_zero()),
        }
    }

    pub fn base(&self) -> DateBase {
        self.base
    }

    pub fn offset(&self) -> Option<DateOffset> {
        self.offset
    }

    pub fn is_now(&self) -> bool {
        matches!(self.base, DateBase::Now(_))
    }
}

/// Source of the instant `now()` captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock.
    #[default]
    System,
    /// Pinned instant, for reproducible queries.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => t,
        }
    }
}
