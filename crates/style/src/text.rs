//! Label symbolizers: text and shields.

use crate::expression::Expression;
use crate::parsers::{
    parse_bool, parse_char, parse_color, parse_horizontal_alignment, parse_justify_alignment,
    parse_label_placement, parse_number, parse_text_convert, parse_unsigned,
    parse_vertical_alignment,
};
use crate::symbolizer::{AttributeError, AttributeList, SymbolizerAttributes, unknown};
use mapstyle_types::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum LabelPlacement {
    #[default]
    Point,
    Line,
    Vertex,
}

impl LabelPlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPlacement::Point => "point",
            LabelPlacement::Line => "line",
            LabelPlacement::Vertex => "vertex",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Middle => "middle",
            VerticalAlignment::Bottom => "bottom",
        }
    }

    /// Labels pushed down sit below their anchor; labels pushed up sit above it.
    pub fn from_dy(dy: f64) -> Self {
        if dy > 0.0 {
            VerticalAlignment::Bottom
        } else if dy < 0.0 {
            VerticalAlignment::Top
        } else {
            VerticalAlignment::Middle
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Middle,
    Right,
}

impl HorizontalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Middle => "middle",
            HorizontalAlignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum JustifyAlignment {
    Left,
    #[default]
    Middle,
    Right,
}

impl JustifyAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            JustifyAlignment::Left => "left",
            JustifyAlignment::Middle => "middle",
            JustifyAlignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TextConvert {
    #[default]
    None,
    ToUpper,
    ToLower,
}

impl TextConvert {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextConvert::None => "none",
            TextConvert::ToUpper => "toupper",
            TextConvert::ToLower => "tolower",
        }
    }
}

/// Properties shared by every label-producing symbolizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub name: Expression,
    pub face_name: Option<String>,
    pub fontset_name: Option<String>,
    pub size: f64,
    pub fill: Color,
    pub dx: f64,
    pub dy: f64,
    pub placement: LabelPlacement,
    /// `None` means derived from `dy`, see [`VerticalAlignment::from_dy`].
    pub vertical_alignment: Option<VerticalAlignment>,
    pub horizontal_alignment: HorizontalAlignment,
    pub justify_alignment: JustifyAlignment,
    pub halo_fill: Color,
    pub halo_radius: f64,
    pub text_ratio: u32,
    pub wrap_width: u32,
    pub wrap_before: bool,
    pub wrap_character: char,
    pub text_convert: TextConvert,
    pub line_spacing: u32,
    pub character_spacing: u32,
    pub spacing: u32,
    pub min_distance: u32,
    pub label_position_tolerance: u32,
    pub avoid_edges: bool,
    pub allow_overlap: bool,
    pub force_odd_labels: bool,
    pub max_char_angle_delta: f64,
    pub opacity: f64,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            name: Expression::default(),
            face_name: None,
            fontset_name: None,
            size: 10.0,
            fill: Color::BLACK,
            dx: 0.0,
            dy: 0.0,
            placement: LabelPlacement::Point,
            vertical_alignment: None,
            horizontal_alignment: HorizontalAlignment::Middle,
            justify_alignment: JustifyAlignment::Middle,
            halo_fill: Color::WHITE,
            halo_radius: 0.0,
            text_ratio: 0,
            wrap_width: 0,
            wrap_before: false,
            wrap_character: ' ',
            text_convert: TextConvert::None,
            line_spacing: 0,
            character_spacing: 0,
            spacing: 0,
            min_distance: 0,
            label_position_tolerance: 0,
            avoid_edges: false,
            allow_overlap: false,
            force_odd_labels: false,
            max_char_angle_delta: 0.0,
            opacity: 1.0,
        }
    }
}

const TEXT_ATTRIBUTES: &[&str] = &[
    "name",
    "face_name",
    "fontset_name",
    "size",
    "fill",
    "dx",
    "dy",
    "placement",
    "vertical_alignment",
    "horizontal_alignment",
    "justify_alignment",
    "halo_fill",
    "halo_radius",
    "text_ratio",
    "wrap_width",
    "wrap_before",
    "wrap_character",
    "text_convert",
    "line_spacing",
    "character_spacing",
    "spacing",
    "min_distance",
    "label_position_tolerance",
    "avoid_edges",
    "allow_overlap",
    "force_odd_labels",
    "max_char_angle_delta",
    "opacity",
];

/// Why a label has no usable font.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSourceError {
    #[error("neither face_name nor fontset_name is set")]
    Missing,
    #[error("both face_name and fontset_name are set")]
    Conflicting,
}

impl TextProperties {
    /// Exactly one of `face_name` and `fontset_name` must be set.
    pub fn check_font_source(&self) -> Result<(), FontSourceError> {
        match (&self.face_name, &self.fontset_name) {
            (Some(_), Some(_)) => Err(FontSourceError::Conflicting),
            (None, None) => Err(FontSourceError::Missing),
            _ => Ok(()),
        }
    }

    pub fn new(name: Expression, face_name: &str, size: f64, fill: Color) -> Self {
        Self {
            name,
            face_name: Some(face_name.to_string()),
            size,
            fill,
            ..Self::default()
        }
    }

    pub fn effective_vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
            .unwrap_or_else(|| VerticalAlignment::from_dy(self.dy))
    }

    /// Returns `Ok(false)` when `name` is not a text property.
    fn set(&mut self, name: &str, value: &str) -> Result<bool, AttributeError> {
        match name {
            "name" => self.name = Expression::parse(value)?,
            "face_name" => self.face_name = Some(value.to_string()),
            "fontset_name" => self.fontset_name = Some(value.to_string()),
            "size" => self.size = parse_number(name, value)?,
            "fill" => self.fill = parse_color(value)?,
            "dx" => self.dx = parse_number(name, value)?,
            "dy" => self.dy = parse_number(name, value)?,
            "placement" => self.placement = parse_label_placement(value)?,
            "vertical_alignment" => {
                self.vertical_alignment = Some(parse_vertical_alignment(value)?)
            }
            "horizontal_alignment" => {
                self.horizontal_alignment = parse_horizontal_alignment(value)?
            }
            "justify_alignment" => self.justify_alignment = parse_justify_alignment(value)?,
            "halo_fill" => self.halo_fill = parse_color(value)?,
            "halo_radius" => self.halo_radius = parse_number(name, value)?,
            "text_ratio" => self.text_ratio = parse_unsigned(name, value)?,
            "wrap_width" => self.wrap_width = parse_unsigned(name, value)?,
            "wrap_before" => self.wrap_before = parse_bool(name, value)?,
            "wrap_character" => self.wrap_character = parse_char(name, value)?,
            "text_convert" => self.text_convert = parse_text_convert(value)?,
            "line_spacing" => self.line_spacing = parse_unsigned(name, value)?,
            "character_spacing" => self.character_spacing = parse_unsigned(name, value)?,
            "spacing" => self.spacing = parse_unsigned(name, value)?,
            "min_distance" => self.min_distance = parse_unsigned(name, value)?,
            "label_position_tolerance" => {
                self.label_position_tolerance = parse_unsigned(name, value)?
            }
            "avoid_edges" => self.avoid_edges = parse_bool(name, value)?,
            "allow_overlap" => self.allow_overlap = parse_bool(name, value)?,
            "force_odd_labels" => self.force_odd_labels = parse_bool(name, value)?,
            "max_char_angle_delta" => self.max_char_angle_delta = parse_number(name, value)?,
            "opacity" => self.opacity = parse_number(name, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn get(&self, name: &str) -> Option<String> {
        Some(match name {
            "name" => self.name.to_string(),
            "face_name" => self.face_name.clone().unwrap_or_default(),
            "fontset_name" => self.fontset_name.clone().unwrap_or_default(),
            "size" => self.size.to_string(),
            "fill" => self.fill.to_css_string(),
            "dx" => self.dx.to_string(),
            "dy" => self.dy.to_string(),
            "placement" => self.placement.as_str().to_string(),
            "vertical_alignment" => self.effective_vertical_alignment().as_str().to_string(),
            "horizontal_alignment" => self.horizontal_alignment.as_str().to_string(),
            "justify_alignment" => self.justify_alignment.as_str().to_string(),
            "halo_fill" => self.halo_fill.to_css_string(),
            "halo_radius" => self.halo_radius.to_string(),
            "text_ratio" => self.text_ratio.to_string(),
            "wrap_width" => self.wrap_width.to_string(),
            "wrap_before" => self.wrap_before.to_string(),
            "wrap_character" => self.wrap_character.to_string(),
            "text_convert" => self.text_convert.as_str().to_string(),
            "line_spacing" => self.line_spacing.to_string(),
            "character_spacing" => self.character_spacing.to_string(),
            "spacing" => self.spacing.to_string(),
            "min_distance" => self.min_distance.to_string(),
            "label_position_tolerance" => self.label_position_tolerance.to_string(),
            "avoid_edges" => self.avoid_edges.to_string(),
            "allow_overlap" => self.allow_overlap.to_string(),
            "force_odd_labels" => self.force_odd_labels.to_string(),
            "max_char_angle_delta" => self.max_char_angle_delta.to_string(),
            "opacity" => self.opacity.to_string(),
            _ => return None,
        })
    }

    /// `name`, the font and `size`/`fill` are always written; the rest only
    /// when they differ from the defaults.
    fn write(&self, out: &mut AttributeList, opacity_name: &'static str) {
        let d = TextProperties::default();
        out.always("name", &self.name);
        if let Some(face) = &self.face_name {
            out.always("face_name", face);
        }
        if let Some(fontset) = &self.fontset_name {
            out.always("fontset_name", fontset);
        }
        out.always("size", self.size);
        out.always("fill", self.fill);
        out.push("dx", self.dx, self.dx == d.dx);
        out.push("dy", self.dy, self.dy == d.dy);
        out.push("placement", self.placement.as_str(), self.placement == d.placement);
        // An explicit alignment is kept even when it matches the derived one.
        match self.vertical_alignment {
            Some(valign) => out.always("vertical_alignment", valign.as_str()),
            None => out.push(
                "vertical_alignment",
                VerticalAlignment::from_dy(self.dy).as_str(),
                true,
            ),
        }
        out.push(
            "horizontal_alignment",
            self.horizontal_alignment.as_str(),
            self.horizontal_alignment == d.horizontal_alignment,
        );
        out.push(
            "justify_alignment",
            self.justify_alignment.as_str(),
            self.justify_alignment == d.justify_alignment,
        );
        out.push("halo_fill", self.halo_fill, self.halo_fill == d.halo_fill);
        out.push("halo_radius", self.halo_radius, self.halo_radius == d.halo_radius);
        out.push("text_ratio", self.text_ratio, self.text_ratio == d.text_ratio);
        out.push("wrap_width", self.wrap_width, self.wrap_width == d.wrap_width);
        out.push("wrap_before", self.wrap_before, self.wrap_before == d.wrap_before);
        out.push(
            "wrap_character",
            self.wrap_character,
            self.wrap_character == d.wrap_character,
        );
        out.push(
            "text_convert",
            self.text_convert.as_str(),
            self.text_convert == d.text_convert,
        );
        out.push("line_spacing", self.line_spacing, self.line_spacing == d.line_spacing);
        out.push(
            "character_spacing",
            self.character_spacing,
            self.character_spacing == d.character_spacing,
        );
        out.push("spacing", self.spacing, self.spacing == d.spacing);
        out.push("min_distance", self.min_distance, self.min_distance == d.min_distance);
        out.push(
            "label_position_tolerance",
            self.label_position_tolerance,
            self.label_position_tolerance == d.label_position_tolerance,
        );
        out.push("avoid_edges", self.avoid_edges, self.avoid_edges == d.avoid_edges);
        out.push("allow_overlap", self.allow_overlap, self.allow_overlap == d.allow_overlap);
        out.push(
            "force_odd_labels",
            self.force_odd_labels,
            self.force_odd_labels == d.force_odd_labels,
        );
        out.push(
            "max_char_angle_delta",
            self.max_char_angle_delta,
            self.max_char_angle_delta == d.max_char_angle_delta,
        );
        out.push(opacity_name, self.opacity, self.opacity == d.opacity);
    }
}

// --- Text ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSymbolizer {
    pub properties: TextProperties,
}

impl TextSymbolizer {
    pub fn new(name: Expression, face_name: &str, size: f64, fill: Color) -> Self {
        Self {
            properties: TextProperties::new(name, face_name, size, fill),
        }
    }
}

impl SymbolizerAttributes for TextSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        if self.properties.set(name, value)? {
            Ok(())
        } else {
            Err(unknown("TextSymbolizer", name))
        }
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        self.properties
            .get(name)
            .ok_or_else(|| unknown("TextSymbolizer", name))
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        TEXT_ATTRIBUTES
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        self.properties.write(&mut out, "opacity");
        out.into_vec()
    }
}

// --- Shield ---

/// A label drawn on top of an image. `opacity` applies to the image;
/// the text opacity is `text-opacity` in documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldSymbolizer {
    pub text: TextProperties,
    pub file: String,
    pub shield_dx: f64,
    pub shield_dy: f64,
    pub unlock_image: bool,
    pub no_text: bool,
    pub opacity: f64,
}

impl Default for ShieldSymbolizer {
    fn default() -> Self {
        Self {
            text: TextProperties::default(),
            file: String::new(),
            shield_dx: 0.0,
            shield_dy: 0.0,
            unlock_image: false,
            no_text: false,
            opacity: 1.0,
        }
    }
}

const SHIELD_ATTRIBUTES: &[&str] = &[
    "name",
    "face_name",
    "fontset_name",
    "size",
    "fill",
    "dx",
    "dy",
    "placement",
    "vertical_alignment",
    "horizontal_alignment",
    "justify_alignment",
    "halo_fill",
    "halo_radius",
    "text_ratio",
    "wrap_width",
    "wrap_before",
    "wrap_character",
    "text_convert",
    "line_spacing",
    "character_spacing",
    "spacing",
    "min_distance",
    "label_position_tolerance",
    "avoid_edges",
    "allow_overlap",
    "force_odd_labels",
    "max_char_angle_delta",
    "text-opacity",
    "file",
    "shield_dx",
    "shield_dy",
    "unlock_image",
    "no_text",
    "opacity",
];

impl ShieldSymbolizer {
    pub fn new(
        name: Expression,
        face_name: &str,
        size: f64,
        fill: Color,
        file: impl Into<String>,
    ) -> Self {
        Self {
            text: TextProperties::new(name, face_name, size, fill),
            file: file.into(),
            ..Self::default()
        }
    }
}

impl SymbolizerAttributes for ShieldSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "file" => self.file = value.to_string(),
            "shield_dx" => self.shield_dx = parse_number(name, value)?,
            "shield_dy" => self.shield_dy = parse_number(name, value)?,
            "unlock_image" => self.unlock_image = parse_bool(name, value)?,
            "no_text" => self.no_text = parse_bool(name, value)?,
            "opacity" => self.opacity = parse_number(name, value)?,
            "text-opacity" => self.text.opacity = parse_number(name, value)?,
            _ => {
                if !self.text.set(name, value)? {
                    return Err(unknown("ShieldSymbolizer", name));
                }
            }
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "file" => self.file.clone(),
            "shield_dx" => self.shield_dx.to_string(),
            "shield_dy" => self.shield_dy.to_string(),
            "unlock_image" => self.unlock_image.to_string(),
            "no_text" => self.no_text.to_string(),
            "opacity" => self.opacity.to_string(),
            "text-opacity" => self.text.opacity.to_string(),
            _ => self
                .text
                .get(name)
                .ok_or_else(|| unknown("ShieldSymbolizer", name))?,
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        SHIELD_ATTRIBUTES
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        self.text.write(&mut out, "text-opacity");
        out.always("file", &self.file);
        out.push("shield_dx", self.shield_dx, self.shield_dx == 0.0);
        out.push("shield_dy", self.shield_dy, self.shield_dy == 0.0);
        out.push("unlock_image", self.unlock_image, !self.unlock_image);
        out.push("no_text", self.no_text, !self.no_text);
        out.push("opacity", self.opacity, self.opacity == 1.0);
        out.into_vec()
    }
}
