//! Symbolizers: the paint instructions attached to a rule.
//!
//! Each variant has a closed set of typed fields. Document attributes are
//! mapped onto those fields through [`SymbolizerAttributes`], a string-keyed
//! table the loader and saver drive without knowing the concrete variant.

use crate::parsers::{
    StyleParseError, parse_bool, parse_color, parse_dash_array, parse_line_cap, parse_line_join,
    parse_number, parse_pattern_alignment,
};
use crate::raster::RasterSymbolizer;
use crate::stroke::Stroke;
use crate::text::{ShieldSymbolizer, TextProperties, TextSymbolizer};
use mapstyle_types::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("Unknown attribute '{name}' for {symbolizer}")]
    Unknown {
        symbolizer: &'static str,
        name: String,
    },

    #[error(transparent)]
    Invalid(#[from] StyleParseError),
}

/// String-keyed access to a symbolizer's attributes, using the names found
/// in map documents.
pub trait SymbolizerAttributes {
    /// Parses `value` and stores it in the field named `name`.
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError>;

    /// The current value of `name` in document form. Unset optional values
    /// read as the empty string.
    fn attribute(&self, name: &str) -> Result<String, AttributeError>;

    /// Every attribute name this variant defines.
    fn attribute_names(&self) -> &'static [&'static str];

    /// The `(name, value)` pairs to write to a document. Only values that
    /// differ from the defaults are returned unless `explicit_defaults` is set.
    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)>;
}

/// Collects attributes for writing, dropping default values unless asked
/// to keep them.
pub(crate) struct AttributeList {
    explicit_defaults: bool,
    entries: Vec<(&'static str, String)>,
}

impl AttributeList {
    pub(crate) fn new(explicit_defaults: bool) -> Self {
        Self {
            explicit_defaults,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: impl ToString, is_default: bool) {
        if self.explicit_defaults || !is_default {
            self.entries.push((name, value.to_string()));
        }
    }

    /// Written regardless of `explicit_defaults`.
    pub(crate) fn always(&mut self, name: &'static str, value: impl ToString) {
        self.entries.push((name, value.to_string()));
    }

    pub(crate) fn into_vec(self) -> Vec<(&'static str, String)> {
        self.entries
    }
}

pub(crate) fn unknown(symbolizer: &'static str, name: &str) -> AttributeError {
    AttributeError::Unknown {
        symbolizer,
        name: name.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PatternAlignment {
    #[default]
    Local,
    Global,
}

impl PatternAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternAlignment::Local => "local",
            PatternAlignment::Global => "global",
        }
    }
}

// --- Point ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSymbolizer {
    /// Marker image; empty means the renderer's default marker.
    pub file: String,
    pub allow_overlap: bool,
    pub ignore_placement: bool,
    pub opacity: f64,
}

impl Default for PointSymbolizer {
    fn default() -> Self {
        Self {
            file: String::new(),
            allow_overlap: false,
            ignore_placement: false,
            opacity: 1.0,
        }
    }
}

impl PointSymbolizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }
}

impl SymbolizerAttributes for PointSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "file" => self.file = value.to_string(),
            "allow_overlap" => self.allow_overlap = parse_bool(name, value)?,
            "ignore_placement" => self.ignore_placement = parse_bool(name, value)?,
            "opacity" => self.opacity = parse_number(name, value)?,
            _ => return Err(unknown("PointSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "file" => self.file.clone(),
            "allow_overlap" => self.allow_overlap.to_string(),
            "ignore_placement" => self.ignore_placement.to_string(),
            "opacity" => self.opacity.to_string(),
            _ => return Err(unknown("PointSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["file", "allow_overlap", "ignore_placement", "opacity"]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        if !self.file.is_empty() {
            out.always("file", &self.file);
        }
        out.push("allow_overlap", self.allow_overlap, !self.allow_overlap);
        out.push("ignore_placement", self.ignore_placement, !self.ignore_placement);
        out.push("opacity", self.opacity, self.opacity == 1.0);
        out.into_vec()
    }
}

// --- Line ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSymbolizer {
    pub stroke: Stroke,
}

impl LineSymbolizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with(color: Color, width: f64) -> Self {
        Self::from_stroke(Stroke::new_with(color, width))
    }

    pub fn from_stroke(stroke: Stroke) -> Self {
        Self { stroke }
    }
}

impl SymbolizerAttributes for LineSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        let stroke = &mut self.stroke;
        match name {
            "stroke" => stroke.color = parse_color(value)?,
            "stroke-width" => stroke.width = parse_number(name, value)?,
            "stroke-opacity" => stroke.opacity = parse_number(name, value)?,
            "stroke-linejoin" => stroke.line_join = parse_line_join(value)?,
            "stroke-linecap" => stroke.line_cap = parse_line_cap(value)?,
            "stroke-dasharray" if value.trim().is_empty() => stroke.clear_dashes(),
            "stroke-dasharray" => stroke.set_dashes(parse_dash_array(value)?),
            "stroke-dashoffset" => stroke.dash_offset = parse_number(name, value)?,
            _ => return Err(unknown("LineSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        let stroke = &self.stroke;
        Ok(match name {
            "stroke" => stroke.color.to_css_string(),
            "stroke-width" => stroke.width.to_string(),
            "stroke-opacity" => stroke.opacity.to_string(),
            "stroke-linejoin" => stroke.line_join.as_str().to_string(),
            "stroke-linecap" => stroke.line_cap.as_str().to_string(),
            "stroke-dasharray" => stroke.dash_array_string(),
            "stroke-dashoffset" => stroke.dash_offset.to_string(),
            _ => return Err(unknown("LineSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[
            "stroke",
            "stroke-width",
            "stroke-opacity",
            "stroke-linejoin",
            "stroke-linecap",
            "stroke-dasharray",
            "stroke-dashoffset",
        ]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let stroke = &self.stroke;
        let defaults = Stroke::default();
        let mut out = AttributeList::new(explicit_defaults);
        out.push("stroke", stroke.color, stroke.color == defaults.color);
        out.push("stroke-width", stroke.width, stroke.width == defaults.width);
        out.push("stroke-opacity", stroke.opacity, stroke.opacity == defaults.opacity);
        out.push(
            "stroke-linejoin",
            stroke.line_join.as_str(),
            stroke.line_join == defaults.line_join,
        );
        out.push(
            "stroke-linecap",
            stroke.line_cap.as_str(),
            stroke.line_cap == defaults.line_cap,
        );
        if stroke.has_dash() {
            out.always("stroke-dasharray", stroke.dash_array_string());
        }
        out.push(
            "stroke-dashoffset",
            stroke.dash_offset,
            stroke.dash_offset == defaults.dash_offset,
        );
        out.into_vec()
    }
}

// --- Polygon ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSymbolizer {
    pub fill: Color,
    pub fill_opacity: f64,
    pub gamma: f64,
}

impl Default for PolygonSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::GRAY,
            fill_opacity: 1.0,
            gamma: 1.0,
        }
    }
}

impl PolygonSymbolizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill(fill: Color) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }
}

impl SymbolizerAttributes for PolygonSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "fill" => self.fill = parse_color(value)?,
            "fill-opacity" => self.fill_opacity = parse_number(name, value)?,
            "gamma" => self.gamma = parse_number(name, value)?,
            _ => return Err(unknown("PolygonSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "fill" => self.fill.to_css_string(),
            "fill-opacity" => self.fill_opacity.to_string(),
            "gamma" => self.gamma.to_string(),
            _ => return Err(unknown("PolygonSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["fill", "fill-opacity", "gamma"]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        out.push("fill", self.fill, self.fill == Color::GRAY);
        out.push("fill-opacity", self.fill_opacity, self.fill_opacity == 1.0);
        out.push("gamma", self.gamma, self.gamma == 1.0);
        out.into_vec()
    }
}

// --- Building ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSymbolizer {
    pub fill: Color,
    pub fill_opacity: f64,
    pub height: f64,
}

impl Default for BuildingSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::GRAY,
            fill_opacity: 1.0,
            height: 0.0,
        }
    }
}

impl BuildingSymbolizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolizerAttributes for BuildingSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "fill" => self.fill = parse_color(value)?,
            "fill-opacity" => self.fill_opacity = parse_number(name, value)?,
            "height" => self.height = parse_number(name, value)?,
            _ => return Err(unknown("BuildingSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "fill" => self.fill.to_css_string(),
            "fill-opacity" => self.fill_opacity.to_string(),
            "height" => self.height.to_string(),
            _ => return Err(unknown("BuildingSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["fill", "fill-opacity", "height"]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        out.push("fill", self.fill, self.fill == Color::GRAY);
        out.push("fill-opacity", self.fill_opacity, self.fill_opacity == 1.0);
        out.push("height", self.height, self.height == 0.0);
        out.into_vec()
    }
}

// --- Patterns ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePatternSymbolizer {
    pub file: String,
}

impl LinePatternSymbolizer {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

impl SymbolizerAttributes for LinePatternSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "file" => self.file = value.to_string(),
            _ => return Err(unknown("LinePatternSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        match name {
            "file" => Ok(self.file.clone()),
            _ => Err(unknown("LinePatternSymbolizer", name)),
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["file"]
    }

    fn write_attributes(&self, _explicit_defaults: bool) -> Vec<(&'static str, String)> {
        vec![("file", self.file.clone())]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonPatternSymbolizer {
    pub file: String,
    pub alignment: PatternAlignment,
}

impl PolygonPatternSymbolizer {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            alignment: PatternAlignment::Local,
        }
    }
}

impl SymbolizerAttributes for PolygonPatternSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "file" => self.file = value.to_string(),
            "alignment" => self.alignment = parse_pattern_alignment(value)?,
            _ => return Err(unknown("PolygonPatternSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "file" => self.file.clone(),
            "alignment" => self.alignment.as_str().to_string(),
            _ => return Err(unknown("PolygonPatternSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["file", "alignment"]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        out.always("file", &self.file);
        out.push(
            "alignment",
            self.alignment.as_str(),
            self.alignment == PatternAlignment::Local,
        );
        out.into_vec()
    }
}

// --- The tagged union ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Symbolizer {
    Point(PointSymbolizer),
    Line(LineSymbolizer),
    Polygon(PolygonSymbolizer),
    Text(TextSymbolizer),
    Shield(ShieldSymbolizer),
    Raster(RasterSymbolizer),
    Building(BuildingSymbolizer),
    LinePattern(LinePatternSymbolizer),
    PolygonPattern(PolygonPatternSymbolizer),
}

impl Symbolizer {
    /// The document element name for this variant.
    pub fn element_name(&self) -> &'static str {
        match self {
            Symbolizer::Point(_) => "PointSymbolizer",
            Symbolizer::Line(_) => "LineSymbolizer",
            Symbolizer::Polygon(_) => "PolygonSymbolizer",
            Symbolizer::Text(_) => "TextSymbolizer",
            Symbolizer::Shield(_) => "ShieldSymbolizer",
            Symbolizer::Raster(_) => "RasterSymbolizer",
            Symbolizer::Building(_) => "BuildingSymbolizer",
            Symbolizer::LinePattern(_) => "LinePatternSymbolizer",
            Symbolizer::PolygonPattern(_) => "PolygonPatternSymbolizer",
        }
    }

    /// A default-valued symbolizer for a document element name.
    pub fn from_element_name(name: &str) -> Option<Symbolizer> {
        Some(match name {
            "PointSymbolizer" => Symbolizer::Point(PointSymbolizer::default()),
            "LineSymbolizer" => Symbolizer::Line(LineSymbolizer::default()),
            "PolygonSymbolizer" => Symbolizer::Polygon(PolygonSymbolizer::default()),
            "TextSymbolizer" => Symbolizer::Text(TextSymbolizer::default()),
            "ShieldSymbolizer" => Symbolizer::Shield(ShieldSymbolizer::default()),
            "RasterSymbolizer" => Symbolizer::Raster(RasterSymbolizer::default()),
            "BuildingSymbolizer" => Symbolizer::Building(BuildingSymbolizer::default()),
            "LinePatternSymbolizer" => Symbolizer::LinePattern(LinePatternSymbolizer::default()),
            "PolygonPatternSymbolizer" => {
                Symbolizer::PolygonPattern(PolygonPatternSymbolizer::default())
            }
            _ => return None,
        })
    }

    /// The label settings of text and shield symbolizers.
    pub fn text_properties(&self) -> Option<&TextProperties> {
        match self {
            Symbolizer::Text(t) => Some(&t.properties),
            Symbolizer::Shield(s) => Some(&s.text),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &dyn SymbolizerAttributes {
        match self {
            Symbolizer::Point(s) => s,
            Symbolizer::Line(s) => s,
            Symbolizer::Polygon(s) => s,
            Symbolizer::Text(s) => s,
            Symbolizer::Shield(s) => s,
            Symbolizer::Raster(s) => s,
            Symbolizer::Building(s) => s,
            Symbolizer::LinePattern(s) => s,
            Symbolizer::PolygonPattern(s) => s,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut dyn SymbolizerAttributes {
        match self {
            Symbolizer::Point(s) => s,
            Symbolizer::Line(s) => s,
            Symbolizer::Polygon(s) => s,
            Symbolizer::Text(s) => s,
            Symbolizer::Shield(s) => s,
            Symbolizer::Raster(s) => s,
            Symbolizer::Building(s) => s,
            Symbolizer::LinePattern(s) => s,
            Symbolizer::PolygonPattern(s) => s,
        }
    }
}

impl SymbolizerAttributes for Symbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        self.attributes_mut().set_attribute(name, value)
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        self.attributes().attribute(name)
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        self.attributes().attribute_names()
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        self.attributes().write_attributes(explicit_defaults)
    }
}

macro_rules! impl_from_variant {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Symbolizer {
                fn from(s: $ty) -> Self {
                    Symbolizer::$variant(s)
                }
            }
        )*
    };
}

impl_from_variant! {
    PointSymbolizer => Point,
    LineSymbolizer => Line,
    PolygonSymbolizer => Polygon,
    TextSymbolizer => Text,
    ShieldSymbolizer => Shield,
    RasterSymbolizer => Raster,
    BuildingSymbolizer => Building,
    LinePatternSymbolizer => LinePattern,
    PolygonPatternSymbolizer => PolygonPattern,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_symbolizer_defaults() {
        let p = PointSymbolizer::new();
        assert_eq!(p.file, "");
        assert!(!p.allow_overlap);
        assert_eq!(p.opacity, 1.0);

        let p = PointSymbolizer::with_file("../data/images/dummy.png");
        assert_eq!(p.file, "../data/images/dummy.png");
        assert!(!p.allow_overlap);
    }

    #[test]
    fn polygon_symbolizer_defaults() {
        let p = PolygonSymbolizer::with_fill(Color::new(0, 0, 0));
        assert_eq!(p.fill, Color::new(0, 0, 0));
        assert_eq!(p.fill_opacity, 1.0);
        assert_eq!(PolygonSymbolizer::new().fill, Color::GRAY);
    }

    #[test]
    fn line_symbolizer_from_stroke() {
        let mut stroke = Stroke::new_with(Color::rgb(0, 0, 0), 2.0);
        stroke.add_dash(5.0, 3.0);
        let l = LineSymbolizer::from_stroke(stroke.clone());
        assert_eq!(l.stroke, stroke);
        assert_eq!(LineSymbolizer::new_with(Color::WHITE, 3.0).stroke.width, 3.0);
    }

    #[test]
    fn set_and_read_attributes() {
        let mut l = LineSymbolizer::new();
        l.set_attribute("stroke", "#ff0000").unwrap();
        l.set_attribute("stroke-width", "2.5").unwrap();
        l.set_attribute("stroke-linejoin", "round").unwrap();
        l.set_attribute("stroke-dasharray", "5,3,1").unwrap();
        assert_eq!(l.stroke.color, Color::rgb(255, 0, 0));
        assert_eq!(l.attribute("stroke-width").unwrap(), "2.5");
        assert_eq!(l.attribute("stroke-linejoin").unwrap(), "round");
        assert_eq!(l.stroke.dashes(), &[(5.0, 3.0), (1.0, 5.0), (3.0, 1.0)]);
        l.set_attribute("stroke-dasharray", "").unwrap();
        assert!(!l.stroke.has_dash());
        assert_eq!(l.attribute("stroke-dasharray").unwrap(), "");

        assert!(matches!(
            l.set_attribute("fill", "red"),
            Err(AttributeError::Unknown { .. })
        ));
        assert!(matches!(
            l.set_attribute("stroke-width", "wide"),
            Err(AttributeError::Invalid(_))
        ));
    }

    #[test]
    fn every_defined_attribute_is_readable() {
        let all: Vec<Symbolizer> = [
            "PointSymbolizer",
            "LineSymbolizer",
            "PolygonSymbolizer",
            "TextSymbolizer",
            "ShieldSymbolizer",
            "RasterSymbolizer",
            "BuildingSymbolizer",
            "LinePatternSymbolizer",
            "PolygonPatternSymbolizer",
        ]
        .iter()
        .filter_map(|n| Symbolizer::from_element_name(n))
        .collect();
        assert_eq!(all.len(), 9);
        for sym in &all {
            for name in sym.attribute_names() {
                assert!(sym.attribute(name).is_ok(), "{} {}", sym.element_name(), name);
            }
            assert!(sym.attribute("no-such-attribute").is_err());
        }
    }

    #[test]
    fn write_only_non_defaults() {
        let mut p = PolygonSymbolizer::new();
        assert!(p.write_attributes(false).is_empty());
        assert_eq!(p.write_attributes(true).len(), 3);
        p.fill_opacity = 0.5;
        assert_eq!(
            p.write_attributes(false),
            vec![("fill-opacity", "0.5".to_string())]
        );
    }

    #[test]
    fn pattern_symbolizers_always_write_file() {
        let lp = LinePatternSymbolizer::new("../data/images/dummy.png");
        assert_eq!(
            lp.write_attributes(false),
            vec![("file", "../data/images/dummy.png".to_string())]
        );
        let pp = PolygonPatternSymbolizer::new("../data/images/dummy.png");
        assert_eq!(pp.alignment, PatternAlignment::Local);
        assert_eq!(pp.write_attributes(false).len(), 1);
    }

    #[test]
    fn element_names_round_trip() {
        let sym: Symbolizer = BuildingSymbolizer::new().into();
        assert_eq!(sym.element_name(), "BuildingSymbolizer");
        let again = Symbolizer::from_element_name(sym.element_name()).unwrap();
        assert_eq!(again, sym);
        assert!(Symbolizer::from_element_name("MarkersSymbolizer").is_none());
    }
}
