//! Map document loading.
//!
//! Documents are parsed with `roxmltree` into a [`Map`]. Structural problems
//! (malformed XML, unknown elements, missing or invalid attribute values)
//! always fail. Unknown attributes fail in strict mode and are otherwise
//! logged and collected as [`LoadWarning`]s.
//!
//! The loaded map is validated last. Strict mode fails on the first
//! [`ValidationError`](crate::error::ValidationError); lenient mode turns
//! each one into a warning.

mod loader;
mod symbolizers;

use crate::error::{Location, MapError};
use crate::map::Map;
use std::fmt;
use std::path::{Path, PathBuf};

/// The newest document version this crate understands. Documents with a
/// greater `minimum_version` are rejected.
pub const DOCUMENT_VERSION: &str = "2.0.0";

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Fail on unknown attributes and duplicate names instead of warning.
    pub strict: bool,
    /// Directory relative file paths are resolved against.
    pub base_path: Option<PathBuf>,
}

impl LoadOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            base_path: None,
        }
    }

    pub fn with_base_path(mut self, base: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base.into());
        self
    }
}

/// A non-fatal problem found while loading in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub message: String,
    pub location: Location,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.location)
    }
}

/// Parses a document into a new 256x256 map.
pub fn load_map(text: &str, options: &LoadOptions) -> Result<Map, MapError> {
    let mut map = Map::default();
    load_map_into(&mut map, text, options)?;
    Ok(map)
}

/// Parses a document into an existing map, adding to its styles, fontsets
/// and layers, then validates the result. Returns the warnings collected in
/// lenient mode.
pub fn load_map_into(
    map: &mut Map,
    text: &str,
    options: &LoadOptions,
) -> Result<Vec<LoadWarning>, MapError> {
    let doc = roxmltree::Document::parse(text).map_err(crate::error::ParseError::from)?;
    let mut parser = loader::MapParser::new(options);
    parser.parse_document(&doc, map)?;

    let mut errors = map.validate();
    if options.strict && !errors.is_empty() {
        return Err(errors.swap_remove(0).into());
    }
    for error in errors {
        parser.warn(doc.root_element(), error.to_string());
    }
    log::debug!(
        "loaded map: {} styles, {} layers, {} warnings",
        map.styles().count(),
        map.layers().len(),
        parser.warnings.len()
    );
    Ok(parser.warnings)
}

/// Reads and parses a document file. Relative paths inside the document are
/// resolved against the file's directory.
pub fn load_map_file(
    map: &mut Map,
    path: &Path,
    strict: bool,
) -> Result<Vec<LoadWarning>, MapError> {
    let text = std::fs::read_to_string(path)?;
    let base = path.parent().map(Path::to_path_buf);
    let options = LoadOptions {
        strict,
        base_path: base,
    };
    load_map_into(map, &text, &options)
}
