//! Datasource trait for abstracting feature access.
//!
//! The style model never reads geodata itself. Layers carry datasource
//! parameters, and whoever renders or queries the map turns those into a
//! `Datasource` through a [`crate::DatasourceRegistry`].

use mapstyle_types::{Box2d, Coord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use thiserror::Error;

/// Datasource parameters as written in map documents, e.g. `type`, `file`.
pub type Parameters = BTreeMap<String, String>;

/// Error type for datasource operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasourceError {
    #[error("Datasource parameters have no 'type'")]
    MissingType,

    #[error("No datasource plugin registered for type '{0}'")]
    UnknownType(String),

    #[error("Invalid datasource parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Query failed: {0}")]
    Query(String),
}

/// A feature attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A single feature: an id, its bounding envelope and named attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u64,
    pub envelope: Box2d,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    pub fn new(id: u64, envelope: Box2d) -> Self {
        Self {
            id,
            envelope,
            properties: BTreeMap::new(),
        }
    }

    pub fn point(id: u64, at: Coord) -> Self {
        Self::new(id, Box2d::from_point(at))
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.properties.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// A source of features.
///
/// Implementations must be shareable across threads; a map can be rendered
/// from several threads at once.
pub trait Datasource: Send + Sync + Debug {
    /// The extent covering every feature.
    fn envelope(&self) -> Box2d;

    /// Features whose envelope contains `at`.
    fn features_at_point(&self, at: Coord) -> Result<Vec<Feature>, DatasourceError>;

    /// Features whose envelope intersects `bbox`.
    fn features_in_box(&self, bbox: &Box2d) -> Result<Vec<Feature>, DatasourceError>;

    /// The parameters the datasource was created from.
    fn params(&self) -> &Parameters;

    /// Returns a human-readable name for this datasource (for logging/debugging).
    fn name(&self) -> &'static str;
}
