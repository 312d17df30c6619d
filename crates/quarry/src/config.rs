//! Builder configuration.
//!
//! [`QueryConfig`] names the reserved content-type field, picks the backend
//! the query is rendered for and controls how "now" is written. It can be
//! loaded from YAML or JSON; every key is optional.
//!
//! ```
//! use quarry::{Backend, NowAnchor, QueryConfig};
//!
//! let config = QueryConfig::from_yaml_str(
//!     "backend: elastic\ncontent_type_field: _type\nnow: engine\n",
//! )?;
//! assert_eq!(config.backend, Backend::Elastic);
//! assert_eq!(config.content_type_field, "_type");
//! assert_eq!(config.now, NowAnchor::Engine);
//! # Ok::<(), quarry::QueryError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::serialize::{ElasticSerializer, Serializer, SolrSerializer};

/// Default name of the reserved content-type field.
pub const DEFAULT_CONTENT_TYPE_FIELD: &str = "contentType";

/// Search engine a query is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Lucene/Solr query-parser syntax.
    #[default]
    Solr,
    /// Elasticsearch bool-query DSL.
    Elastic,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Solr => "solr",
            Backend::Elastic => "elastic",
        }
    }

    /// Creates the serializer for this backend.
    pub fn serializer(self, now: NowAnchor) -> Box<dyn Serializer> {
        match self {
            Backend::Solr => Box::new(SolrSerializer::new(now)),
            Backend::Elastic => Box::new(ElasticSerializer::new(now)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a date math expression anchored at "now" is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NowAnchor {
    /// The instant captured when `now()` was called.
    #[default]
    Captured,
    /// The engine's own NOW keyword, evaluated at query time.
    Engine,
}

/// Configuration for a [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Field `content_type(path)` filters on.
    pub content_type_field: String,
    /// Backend the serializer targets.
    pub backend: Backend,
    /// Rendering of "now".
    pub now: NowAnchor,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            content_type_field: DEFAULT_CONTENT_TYPE_FIELD.to_string(),
            backend: Backend::default(),
            now: NowAnchor::default(),
        }
    }
}

impl QueryConfig {
    /// Parses a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_now(mut self, now: NowAnchor) -> Self {
        self.now = now;
        self
    }

    pub fn with_content_type_field(mut self, field: impl Into<String>) -> Self {
        self.content_type_field = field.into();
        self
    }

    /// Creates the serializer this configuration selects.
    pub fn serializer(&self) -> Box<dyn Serializer> {
        self.backend.serializer(self.now)
    }
}
