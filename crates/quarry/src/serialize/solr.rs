//! Lucene/Solr query-parser syntax.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{format_instant, Serializer};
use crate::config::NowAnchor;
use crate::datemath::{DateBase, DateMath, DateUnit};
use crate::error::Result;
use crate::group::{ClauseGroup, GroupMode, Member};
use crate::op::Op;
use crate::predicate::{Operand, Predicate};
use crate::value::Value;

/// Query rendered when the root group has no members.
const MATCH_ALL: &str = "*:*";

// Patterns are literals; compilation cannot fail.
static RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[():\[\]{}\\]").unwrap());
static FIELD_RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[():\[\]{}\\\s]").unwrap());

/// Prefixes every reserved character (`( ) : [ ] { } \`) with a backslash.
///
/// ```
/// use quarry::serialize::escape;
///
/// assert_eq!(escape("a:b (c)"), r"a\:b \(c\)");
/// assert_eq!(escape("plain"), "plain");
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    RESERVED.replace_all(text, r"\$0")
}

/// Escapes a string operand and quotes it when it holds whitespace or a
/// double quote, so it stays a single term.
fn string_operand(text: &str) -> String {
    let escaped = escape(text);
    if text.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", escaped.replace('"', "\\\""))
    } else {
        escaped.into_owned()
    }
}

/// Field names additionally escape whitespace.
fn field_name(name: &str) -> Cow<'_, str> {
    FIELD_RESERVED.replace_all(name, r"\$0")
}

/// A rendered member of a group.
///
/// `negative` marks a clause that only excludes documents. Lucene evaluates
/// such a clause to nothing unless it sits in a conjunction with something
/// positive, so it gets anchored at [`MATCH_ALL`] below the top level.
struct Clause {
    text: String,
    negative: bool,
}

impl Clause {
    fn positive(text: String) -> Self {
        Clause {
            text,
            negative: false,
        }
    }

    /// Text usable as a disjunct.
    fn anchored(self) -> String {
        if self.negative {
            format!("({MATCH_ALL} {})", self.text)
        } else {
            self.text
        }
    }
}

/// Space-joined conjunction. One made only of exclusions starts from
/// every document.
fn conjunction(parts: Vec<Clause>) -> String {
    let all_negative = parts.iter().all(|p| p.negative);
    let joined = parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join(" ");
    if all_negative {
        format!("{MATCH_ALL} {joined}")
    } else {
        joined
    }
}

/// Renders a clause-group tree as a Solr `q` parameter.
///
/// - `And` joins members with a space (the engine's default conjunction).
/// - `Or` renders `(a OR b)`.
/// - `Not` renders `-(a b)`: the conjunction of its members, excluded.
///   Inside a disjunction it becomes `(*:* -(a b))`.
/// - Comparisons use inclusive/exclusive range brackets, e.g. `likes:{50 TO *]`.
/// - String operands with whitespace are quoted: `title:"hello world"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolrSerializer {
    now: NowAnchor,
}

impl SolrSerializer {
    pub fn new(now: NowAnchor) -> Self {
        SolrSerializer { now }
    }

    fn group(&self, group: &ClauseGroup, top: bool) -> Option<Clause> {
        let mut parts: Vec<Clause> = group
            .members()
            .iter()
            .filter_map(|m| self.member(m))
            .collect();
        if parts.is_empty() {
            return None;
        }
        let clause = match group.mode() {
            GroupMode::And if top => Clause {
                negative: parts.iter().all(|p| p.negative),
                text: parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join(" "),
            },
            GroupMode::And if parts.len() == 1 => parts.pop()?,
            GroupMode::And => Clause::positive(format!("({})", conjunction(parts))),
            GroupMode::Or => {
                let disjuncts: Vec<String> = parts.into_iter().map(Clause::anchored).collect();
                Clause::positive(format!("({})", disjuncts.join(" OR ")))
            }
            GroupMode::Not => Clause {
                text: format!("-({})", conjunction(parts)),
                negative: true,
            },
        };
        Some(clause)
    }

    fn member(&self, member: &Member) -> Option<Clause> {
        match member {
            Member::Predicate(p) => Some(Clause::positive(self.predicate(p))),
            Member::Group(g) => self.group(g, false),
        }
    }

    fn predicate(&self, predicate: &Predicate) -> String {
        let field = field_name(predicate.field());
        let mut out = match (predicate.op(), predicate.operand()) {
            (Op::Equals, Operand::Single(v)) => format!("{field}:{}", self.term(v)),
            (Op::GreaterThan, Operand::Single(v)) => format!("{field}:{{{} TO *]", self.bound(v)),
            (Op::GreaterOrEqual, Operand::Single(v)) => {
                format!("{field}:[{} TO *]", self.bound(v))
            }
            (Op::LessOrEqual, Operand::Single(v)) => format!("{field}:[* TO {}]", self.bound(v)),
            (_, Operand::Range { lower, upper }) => {
                format!("{field}:[{} TO {}]", self.bound(lower), self.bound(upper))
            }
            (Op::Range, Operand::Single(v)) => {
                let v = self.bound(v);
                format!("{field}:[{v} TO {v}]")
            }
        };
        if let Some(boost) = predicate.effective_boost() {
            out.push('^');
            out.push_str(&boost.to_string());
        }
        out
    }

    /// Operand of an equality clause. Dates are quoted rather than escaped.
    fn term(&self, value: &Value) -> String {
        match value {
            Value::Date(_) | Value::DateMath(_) => format!("\"{}\"", self.bound(value)),
            _ => self.bound(value),
        }
    }

    /// Operand inside range brackets.
    fn bound(&self, value: &Value) -> String {
        match value {
            Value::String(s) => string_operand(s),
            Value::Number(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => format_instant(*d),
            Value::DateMath(expr) => self.date_math(expr),
        }
    }

    fn date_math(&self, expr: &DateMath) -> String {
        let mut out = match (expr.base(), self.now) {
            (DateBase::Now(_), NowAnchor::Engine) => "NOW".to_string(),
            (base, _) => format_instant(base.instant()),
        };
        if let Some(offset) = expr.offset() {
            out.push_str(&format!("{:+}{}", offset.amount(), unit_token(offset.unit())));
        }
        out
    }
}

fn unit_token(unit: DateUnit) -> &'static str {
    match unit {
        DateUnit::Seconds => "SECONDS",
        DateUnit::Minutes => "MINUTES",
        DateUnit::Hours => "HOURS",
        DateUnit::Days => "DAYS",
        DateUnit::Months => "MONTHS",
        DateUnit::Years => "YEARS",
    }
}

impl Serializer for SolrSerializer {
    fn backend(&self) -> &'static str {
        "solr"
    }

    fn to_text(&self, root: &ClauseGroup) -> Result<String> {
        let text = self
            .group(root, true)
            .map(|clause| clause.text)
            .unwrap_or_else(|| MATCH_ALL.to_string());
        tracing::trace!(backend = self.backend(), len = text.len(), "rendered query");
        Ok(text)
    }
}
