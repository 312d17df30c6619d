//! Elasticsearch bool-query DSL.

use serde_json::{json, Map, Value as Json};

use super::{format_instant, Serializer};
use crate::config::NowAnchor;
use crate::datemath::{DateBase, DateMath, DateUnit};
use crate::error::Result;
use crate::group::{ClauseGroup, GroupMode, Member};
use crate::op::Op;
use crate::predicate::{Operand, Predicate};
use crate::value::{Number, Value};

/// Renders a clause-group tree as an Elasticsearch `query` object.
///
/// `And` becomes `bool.must`, `Or` becomes `bool.should` with
/// `minimum_should_match: 1`, and `Not` becomes `bool.must_not` over the
/// conjunction of its members. Equality is a `match`, or a `match_phrase`
/// when the string operand holds whitespace. The text form is the compact
/// JSON encoding of the object.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticSerializer {
    now: NowAnchor,
}

impl ElasticSerializer {
    pub fn new(now: NowAnchor) -> Self {
        ElasticSerializer { now }
    }

    fn group(&self, group: &ClauseGroup) -> Option<Json> {
        let mut parts: Vec<Json> = group
            .members()
            .iter()
            .filter_map(|m| self.member(m))
            .collect();
        if parts.is_empty() {
            return None;
        }
        let rendered = match group.mode() {
            GroupMode::And => json!({ "bool": { "must": parts } }),
            GroupMode::Or => json!({
                "bool": { "should": parts, "minimum_should_match": 1 }
            }),
            GroupMode::Not => {
                let excluded = if parts.len() == 1 {
                    parts.remove(0)
                } else {
                    json!({ "bool": { "must": parts } })
                };
                json!({ "bool": { "must_not": [excluded] } })
            }
        };
        Some(rendered)
    }

    fn member(&self, member: &Member) -> Option<Json> {
        match member {
            Member::Predicate(p) => Some(self.predicate(p)),
            Member::Group(g) => self.group(g),
        }
    }

    fn predicate(&self, predicate: &Predicate) -> Json {
        let mut body = Map::new();
        let kind = match (predicate.op(), predicate.operand()) {
            (Op::Equals, Operand::Single(v)) => {
                body.insert("query".into(), self.value(v));
                if let Some(boost) = predicate.effective_boost() {
                    body.insert("boost".into(), json!(boost));
                }
                match v {
                    Value::String(s) if s.chars().any(char::is_whitespace) => "match_phrase",
                    _ => "match",
                }
            }
            (Op::GreaterThan, Operand::Single(v)) => {
                body.insert("gt".into(), self.value(v));
                "range"
            }
            (Op::GreaterOrEqual, Operand::Single(v)) => {
                body.insert("gte".into(), self.value(v));
                "range"
            }
            (Op::LessOrEqual, Operand::Single(v)) => {
                body.insert("lte".into(), self.value(v));
                "range"
            }
            (_, Operand::Range { lower, upper }) => {
                body.insert("gte".into(), self.value(lower));
                body.insert("lte".into(), self.value(upper));
                "range"
            }
            (Op::Range, Operand::Single(v)) => {
                body.insert("gte".into(), self.value(v));
                body.insert("lte".into(), self.value(v));
                "range"
            }
        };
        let mut field = Map::new();
        field.insert(predicate.field().to_string(), Json::Object(body));
        let mut clause = Map::new();
        clause.insert(kind.to_string(), Json::Object(field));
        Json::Object(clause)
    }

    fn value(&self, value: &Value) -> Json {
        match value {
            Value::String(s) => json!(s),
            Value::Number(Number::I64(n)) => json!(n),
            Value::Number(Number::U64(n)) => json!(n),
            Value::Number(Number::F64(n)) => json!(n),
            Value::Boolean(b) => json!(b),
            Value::Date(d) => json!(format_instant(*d)),
            Value::DateMath(expr) => json!(self.date_math(expr)),
        }
    }

    fn date_math(&self, expr: &DateMath) -> String {
        let (mut out, separator) = match (expr.base(), self.now) {
            (DateBase::Now(_), NowAnchor::Engine) => ("now".to_string(), ""),
            (base, _) => (format_instant(base.instant()), "||"),
        };
        if let Some(offset) = expr.offset() {
            out.push_str(separator);
            out.push_str(&format!("{:+}{}", offset.amount(), unit_token(offset.unit())));
        }
        out
    }
}

fn unit_token(unit: DateUnit) -> &'static str {
    match unit {
        DateUnit::Seconds => "s",
        DateUnit::Minutes => "m",
        DateUnit::Hours => "h",
        DateUnit::Days => "d",
        DateUnit::Months => "M",
        DateUnit::Years => "y",
    }
}

impl Serializer for ElasticSerializer {
    fn backend(&self) -> &'static str {
        "elastic"
    }

    fn to_text(&self, root: &ClauseGroup) -> Result<String> {
        let text = serde_json::to_string(&self.to_object(root)?)?;
        tracing::trace!(backend = self.backend(), len = text.len(), "rendered query");
        Ok(text)
    }

    fn to_object(&self, root: &ClauseGroup) -> Result<Json> {
        Ok(self
            .group(root)
            .unwrap_or_else(|| json!({ "match_all": {} })))
    }
}
