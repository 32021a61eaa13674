//! Defines the unified, rich error types for loading, validating and saving maps.

use mapstyle_style::FontSourceError;
use mapstyle_traits::DatasourceError;
use std::fmt;
use thiserror::Error;

/// A struct to hold precise error location information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl From<(usize, usize)> for Location {
    fn from((line, col): (usize, usize)) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

/// Errors raised while reading a map document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Document root must be <Map>, found <{0}>")]
    MissingMapRoot(String),

    #[error("Unknown element <{element}> at {location}")]
    UnknownElement { element: String, location: Location },

    #[error("Missing required attribute '{attribute}' on <{element}> at {location}")]
    MissingAttribute {
        element: String,
        attribute: String,
        location: Location,
    },

    #[error("Unknown attribute '{attribute}' on <{element}> at {location}")]
    UnknownAttribute {
        element: String,
        attribute: String,
        location: Location,
    },

    #[error("Invalid value '{value}' for '{attribute}' on <{element}> at {location}: {message}")]
    InvalidValue {
        element: String,
        attribute: String,
        value: String,
        message: String,
        location: Location,
    },

    #[error("Document structure error at {location}: {message}")]
    Structure { message: String, location: Location },

    #[error("Document requires version {required}, but only {supported} is supported")]
    UnsupportedVersion { required: String, supported: String },
}

/// Consistency problems in an otherwise well-formed map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Layer '{layer}' references missing style '{style}'")]
    MissingStyle { layer: String, style: String },

    #[error("Rule '{rule}' in style '{style}' has min scale {min} above max scale {max}")]
    InvalidScaleRange {
        style: String,
        rule: String,
        min: f64,
        max: f64,
    },

    #[error("Style '{style}' references missing fontset '{fontset}'")]
    MissingFontset { style: String, fontset: String },

    #[error("Label in rule '{rule}' of style '{style}' has no usable font: {problem}")]
    FontSource {
        style: String,
        rule: String,
        problem: FontSourceError,
    },
}

/// The main error enum for all high-level map operations.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("Map document error: {0}")]
    Parse(#[from] ParseError),
    #[error("Map validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write map document: {0}")]
    Write(String),
    #[error("Datasource error: {0}")]
    Datasource(#[from] DatasourceError),
    #[error("Layer srs '{layer_srs}' differs from map srs '{map_srs}'; reprojection is not supported")]
    Projection { layer_srs: String, map_srs: String },
    #[error("No layer at index {0}")]
    LayerNotFound(usize),
    #[error("Layer '{0}' has no datasource")]
    NoDatasource(String),
}
