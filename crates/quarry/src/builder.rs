//! Fluent query builder.
//!
//! [`QueryBuilder`] owns the clause-group tree and a stack of open scopes.
//! Predicates are appended to the innermost open scope; [`QueryBuilder::or`]
//! and [`QueryBuilder::not`] push a new scope, run a closure against the same
//! builder, pop the scope and attach the finished group to its parent.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use quarry::QueryBuilder;
//!
//! let mut q = QueryBuilder::new().at(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
//! q.content_type("blog")?;
//! q.field("title")?.matches("important")?.with_similarity(2.0)?;
//! q.or(|q| {
//!     q.field("featured")?.matches(true)?;
//!     q.field("likes")?.gt(50)?;
//!     Ok(())
//! })?;
//! q.not(|q| {
//!     let now = q.now();
//!     q.field("expired_dt")?.lte(now)?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(
//!     q.serialize()?,
//!     "contentType:blog title:important^2 (featured:true OR likes:{50 TO *]) \
//!      -(expired_dt:[* TO 2024-03-01T00:00:00Z])"
//! );
//! # Ok::<(), quarry::QueryError>(())
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};

use crate::config::QueryConfig;
use crate::datemath::{self, Clock, DateMath, DateOffset, DateUnit};
use crate::error::{QueryError, Result};
use crate::group::{ClauseGroup, GroupMode};
use crate::op::Op;
use crate::predicate::Predicate;
use crate::serialize::Serializer;
use crate::value::Value;

/// Stateful, single-owner builder for one query.
///
/// Invalid input fails at the call that introduced it and leaves the tree
/// untouched, so a builder stays usable after an error.
#[derive(Debug)]
pub struct QueryBuilder {
    config: QueryConfig,
    serializer: Box<dyn Serializer>,
    clock: Clock,
    root: ClauseGroup,
    open: Vec<ClauseGroup>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new()
    }
}

impl QueryBuilder {
    /// Creates a builder with the default configuration (Solr syntax).
    pub fn new() -> Self {
        QueryBuilder::with_config(QueryConfig::default())
    }

    /// Creates a builder rendering for the backend `config` selects.
    pub fn with_config(config: QueryConfig) -> Self {
        let serializer = config.serializer();
        QueryBuilder::with_serializer(config, serializer)
    }

    /// Creates a builder with a caller-provided serializer.
    ///
    /// `config.backend` is ignored; the other settings still apply.
    pub fn with_serializer(config: QueryConfig, serializer: Box<dyn Serializer>) -> Self {
        tracing::debug!(backend = serializer.backend(), "selected serializer");
        QueryBuilder {
            config,
            serializer,
            clock: Clock::default(),
            root: ClauseGroup::default(),
            open: Vec::new(),
        }
    }

    /// Pins the instant [`now`](QueryBuilder::now) captures.
    pub fn at(mut self, instant: DateTime<Utc>) -> Self {
        self.clock = Clock::Fixed(instant);
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    /// Restricts the query to one content type.
    ///
    /// Appends an equality on the configured content-type field to the root
    /// group, whatever scope is open.
    pub fn content_type(&mut self, path: &str) -> Result<&mut Self> {
        if path.trim().is_empty() {
            tracing::debug!("rejected empty content type");
            return Err(QueryError::EmptyContentType);
        }
        let predicate = Predicate::equals(self.config.content_type_field.as_str(), path)?;
        tracing::trace!(content_type = path, "appended content type filter");
        self.root.push(predicate);
        Ok(self)
    }

    /// Starts a predicate on `name` in the innermost open scope.
    ///
    /// The cursor borrows the builder until its terminal method runs, so no
    /// scope can open or close in between: the predicate always lands in the
    /// scope that was open when `field` was called.
    pub fn field(&mut self, name: impl Into<String>) -> Result<FieldCursor<'_>> {
        let field = name.into();
        if field.trim().is_empty() {
            tracing::debug!("rejected empty field name");
            return Err(QueryError::EmptyField);
        }
        Ok(FieldCursor {
            builder: self,
            field,
        })
    }

    /// Adds a disjunction: at least one predicate added by `scope` must match.
    ///
    /// If `scope` fails, its partial group is discarded and the error is
    /// returned; the rest of the tree is unchanged. A scope that adds
    /// nothing is not attached.
    pub fn or<F>(&mut self, scope: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<()>,
    {
        self.scoped(GroupMode::Or, scope)
    }

    /// Adds an exclusion: documents matching all predicates added by `scope`
    /// are excluded.
    pub fn not<F>(&mut self, scope: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<()>,
    {
        self.scoped(GroupMode::Not, scope)
    }

    fn scoped<F>(&mut self, mode: GroupMode, scope: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<()>,
    {
        let (outcome, group) = {
            let mut guard = ScopeGuard::open(self, mode);
            let outcome = scope(&mut *guard);
            (outcome, guard.close())
        };
        outcome?;
        match group {
            Some(group) if !group.is_empty() => self.current_mut().push(group),
            _ => tracing::debug!(%mode, "dropped empty scope"),
        }
        Ok(self)
    }

    /// Date math anchored at the current instant, with no offset.
    pub fn now(&self) -> DateMath {
        DateMath::now(self.clock.now(), None)
    }

    /// Date math anchored at the current instant, shifted by `offset`.
    ///
    /// The offset is folded into a single expression:
    /// `q.now_with(q.minus(1, months())?)` is one "a month ago" value.
    pub fn now_with(&self, offset: DateOffset) -> DateMath {
        DateMath::now(self.clock.now(), Some(offset))
    }

    /// See [`datemath::minus`].
    pub fn minus(&self, amount: i64, unit: DateUnit) -> Result<DateOffset> {
        datemath::minus(amount, unit)
    }

    /// See [`datemath::plus`].
    pub fn plus(&self, amount: i64, unit: DateUnit) -> Result<DateOffset> {
        datemath::plus(amount, unit)
    }

    /// Number of scopes currently open above the root.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// The root group. Scopes still open are not part of it yet.
    pub fn root(&self) -> &ClauseGroup {
        &self.root
    }

    pub fn into_root(self) -> ClauseGroup {
        self.root
    }

    /// Renders the query with the configured serializer.
    pub fn serialize(&self) -> Result<String> {
        self.serializer.to_text(&self.root)
    }

    /// Renders the query as a structured request object.
    ///
    /// Fails with [`QueryError::Unsupported`] on text-only backends.
    pub fn to_object(&self) -> Result<serde_json::Value> {
        self.serializer.to_object(&self.root)
    }

    /// Renders the query and consumes the builder.
    pub fn finish(self) -> Result<String> {
        self.serialize()
    }

    fn current_mut(&mut self) -> &mut ClauseGroup {
        match self.open.last_mut() {
            Some(group) => group,
            None => &mut self.root,
        }
    }

    fn append(&mut self, predicate: Predicate) {
        tracing::trace!(
            field = predicate.field(),
            op = %predicate.op(),
            depth = self.depth(),
            "appended predicate"
        );
        self.current_mut().push(predicate);
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.serialize().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Open scope on a builder. Dropping it pops everything from its own
/// scope upward, so the stack is restored even if the closure panics.
struct ScopeGuard<'a> {
    builder: &'a mut QueryBuilder,
    depth: usize,
}

impl<'a> ScopeGuard<'a> {
    fn open(builder: &'a mut QueryBuilder, mode: GroupMode) -> Self {
        builder.open.push(ClauseGroup::new(mode));
        let depth = builder.open.len();
        tracing::debug!(%mode, depth, "opened scope");
        ScopeGuard { builder, depth }
    }

    /// Pops this guard's scope and returns it.
    fn close(self) -> Option<ClauseGroup> {
        self.builder.open.truncate(self.depth);
        let group = self.builder.open.pop();
        tracing::debug!(depth = self.depth, "closed scope");
        group
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &*self.builder
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut *self.builder
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.builder.open.len() >= self.depth {
            tracing::debug!(depth = self.depth, "discarding unfinished scope");
            self.builder.open.truncate(self.depth - 1);
        }
    }
}

/// Predicate under construction, bound to a field and to the scope that was
/// open when [`QueryBuilder::field`] was called.
#[derive(Debug)]
pub struct FieldCursor<'a> {
    builder: &'a mut QueryBuilder,
    field: String,
}

impl<'a> FieldCursor<'a> {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Appends a full-text match. Follow with
    /// [`with_similarity`](Matched::with_similarity) to boost it.
    pub fn matches(self, value: impl Into<Value>) -> Result<Matched<'a>> {
        let predicate = Predicate::equals(self.field, value)?;
        self.builder.append(predicate);
        Ok(Matched {
            builder: self.builder,
        })
    }

    /// Appends `field > value`.
    pub fn gt(self, value: impl Into<Value>) -> Result<&'a mut QueryBuilder> {
        self.compare(Op::GreaterThan, value.into())
    }

    /// Appends `field >= value`.
    pub fn gte(self, value: impl Into<Value>) -> Result<&'a mut QueryBuilder> {
        self.compare(Op::GreaterOrEqual, value.into())
    }

    /// Appends `field <= value`.
    pub fn lte(self, value: impl Into<Value>) -> Result<&'a mut QueryBuilder> {
        self.compare(Op::LessOrEqual, value.into())
    }

    /// Appends an inclusive range `lower <= field <= upper`.
    pub fn between(
        self,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Result<&'a mut QueryBuilder> {
        let predicate = Predicate::range(self.field, lower, upper)?;
        self.builder.append(predicate);
        Ok(self.builder)
    }

    fn compare(self, op: Op, value: Value) -> Result<&'a mut QueryBuilder> {
        let predicate = Predicate::compare(self.field, op, value)?;
        self.builder.append(predicate);
        Ok(self.builder)
    }
}

/// A just-appended match predicate. Derefs to the builder so chaining can
/// continue.
#[derive(Debug)]
pub struct Matched<'a> {
    builder: &'a mut QueryBuilder,
}

impl<'a> Matched<'a> {
    /// Sets the relevance boost of the match just appended.
    ///
    /// `weight` must be positive; a weight of `1` is rendered as no boost.
    /// On error the predicate stays in the tree without a boost.
    pub fn with_similarity(self, weight: f64) -> Result<&'a mut QueryBuilder> {
        // This borrow is the only one, so the match is still the last member.
        if let Some(predicate) = self.builder.current_mut().last_predicate_mut() {
            if let Err(err) = predicate.set_boost(weight) {
                tracing::debug!(field = predicate.field(), weight, "rejected similarity weight");
                return Err(err);
            }
        }
        Ok(self.builder)
    }

    pub fn into_builder(self) -> &'a mut QueryBuilder {
        self.builder
    }
}

impl Deref for Matched<'_> {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &*self.builder
    }
}

impl DerefMut for Matched<'_> {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut *self.builder
    }
}
