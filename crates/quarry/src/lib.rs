//! Quarry - Fluent builder for boolean full-text search queries.
//!
//! Quarry assembles a query as a tree of predicates and clause groups and
//! renders it into a search engine's own query syntax. It supports:
//!
//! - Typed operands: strings, numbers, booleans, dates and relative date math
//! - Predicates: match (with relevance boost), `gt`, `gte`, `lte`, inclusive range
//! - Nested OR / NOT scopes opened with closures over the same builder
//! - Pluggable serializers: Solr query syntax and Elasticsearch bool-query JSON
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use quarry::datemath::months;
//! use quarry::QueryBuilder;
//!
//! let mut q = QueryBuilder::new().at(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
//! q.content_type("blog")?;
//! q.field("title")?.matches("rust: ownership")?.with_similarity(2.0)?;
//!
//! let month_ago = q.now_with(q.minus(1, months())?);
//! q.field("modified")?.gte(month_ago)?;
//!
//! q.or(|q| {
//!     q.field("featured")?.matches(true)?;
//!     q.field("likes")?.gt(50)?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(
//!     q.to_string(),
//!     r#"contentType:blog title:"rust\: ownership"^2 modified:[2024-03-01T00:00:00Z-1MONTHS TO *] (featured:true OR likes:{50 TO *])"#
//! );
//! # Ok::<(), quarry::QueryError>(())
//! ```
//!
//! # Query Semantics
//!
//! | Group | Matches when | Solr rendering |
//! |-------|--------------|----------------|
//! | `And` (root) | every member matches | `a b` |
//! | `Or` | at least one member matches | `(a OR b)` |
//! | `Not` | not all members match together | `-(a b)`, or `(*:* -(a b))` under `Or` |
//!
//! Operand escaping, bracket syntax and date formatting are the serializer's
//! concern; the tree is the same for every backend. See [`serialize`].

mod builder;
mod config;
pub mod datemath;
mod error;
mod group;
mod op;
mod predicate;
pub mod serialize;
mod value;

// Re-export public API
pub use builder::{FieldCursor, Matched, QueryBuilder};
pub use config::{Backend, NowAnchor, QueryConfig, DEFAULT_CONTENT_TYPE_FIELD};
pub use datemath::{DateBase, DateMath, DateOffset, DateUnit};
pub use error::{QueryError, Result};
pub use group::{ClauseGroup, GroupMode, Member};
pub use op::Op;
pub use predicate::{Operand, Predicate};
pub use serialize::{ElasticSerializer, Serializer, SolrSerializer};
pub use value::{Number, Value};
