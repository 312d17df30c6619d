//! Rendering of clause-group trees into backend query syntax.
//!
//! Each backend implements [`Serializer`]. The tree itself knows nothing
//! about backends; the serializer is picked once when the builder is
//! created (see [`Backend`](crate::Backend)).
//!
//! Serializers are pure: rendering the same tree twice yields the same
//! output, and a failure never leaves a partial result behind.

mod elastic;
mod solr;

pub use elastic::ElasticSerializer;
pub use solr::{escape, SolrSerializer};

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{QueryError, Result};
use crate::group::ClauseGroup;

/// A backend query renderer.
pub trait Serializer: fmt::Debug {
    /// Short backend name, used in errors and logs.
    fn backend(&self) -> &'static str;

    /// Renders `root` as the backend's textual query.
    fn to_text(&self, root: &ClauseGroup) -> Result<String>;

    /// Renders `root` as a structured request object.
    ///
    /// Text-only backends keep the default, which fails with
    /// [`QueryError::Unsupported`].
    fn to_object(&self, root: &ClauseGroup) -> Result<serde_json::Value> {
        let _ = root;
        Err(QueryError::Unsupported {
            backend: self.backend(),
            operation: "object output",
        })
    }
}

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present.
pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
