//! Low-level nom parser functions for style attribute values.
//!
//! This module provides composable parser functions for the value syntaxes
//! found in map documents: numbers, colors, dash arrays and the keyword
//! enumerations used by strokes, labels and rasters.

use crate::raster::{RasterMode, RasterScaling};
use crate::stroke::{LineCap, LineJoin};
use crate::symbolizer::PatternAlignment;
use crate::text::{HorizontalAlignment, JustifyAlignment, LabelPlacement, TextConvert, VerticalAlignment};
use mapstyle_types::Color;
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{map, map_opt, map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },

    #[error("Float parse error: {0}")]
    FloatParse(String),

    #[error("Invalid expression '{expression}': {reason}")]
    Expression { expression: String, reason: String },
}

fn invalid(property: &str, value: &str) -> StyleParseError {
    StyleParseError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}

// --- Helper Parsers ---

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parses a decimal number with optional sign, fraction and exponent.
pub fn parse_f64(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), opt(digit1))))),
                recognize((char('.'), digit1)),
            )),
            opt((
                alt((char('e'), char('E'))),
                opt(alt((char('+'), char('-')))),
                digit1,
            )),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

// --- Color Parsers ---

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    map_res(
        recognize(preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit()))),
        Color::parse_hex,
    )
    .parse(input)
}

/// A channel is either an integer-ish value in [0, 255] or a percentage.
fn rgb_channel(input: &str) -> IResult<&str, u8> {
    map((parse_f64, opt(char('%'))), |(v, pct)| match pct {
        Some(_) => to_channel(v * 255.0 / 100.0),
        None => to_channel(v),
    })
    .parse(input)
}

/// Alpha is given in [0, 1], or as a percentage.
fn alpha_channel(input: &str) -> IResult<&str, u8> {
    map((parse_f64, opt(char('%'))), |(v, pct)| match pct {
        Some(_) => to_channel(v * 255.0 / 100.0),
        None => to_channel(v * 255.0),
    })
    .parse(input)
}

fn rgb_function(input: &str) -> IResult<&str, Color> {
    let (input, has_alpha) = alt((
        map(tag_no_case("rgba"), |_| true),
        map(tag_no_case("rgb"), |_| false),
    ))
    .parse(input)?;
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, r) = rgb_channel(input)?;
    let (input, g) = preceded(ws(char(',')), rgb_channel).parse(input)?;
    let (input, b) = preceded(ws(char(',')), rgb_channel).parse(input)?;
    let (input, a) = if has_alpha {
        preceded(ws(char(',')), alpha_channel).parse(input)?
    } else {
        (input, 255)
    };
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((input, Color::rgba(r, g, b, a)))
}

fn named_color(input: &str) -> IResult<&str, Color> {
    map_opt(take_while1(|c: char| c.is_ascii_alphabetic()), Color::named).parse(input)
}

/// Parses a color: hex (`#f00`, `#ff0000`, `#ff000080`), `rgb()`/`rgba()`
/// with integer or percentage channels, or a named color.
pub fn color_value(input: &str) -> IResult<&str, Color> {
    alt((hex_color, rgb_function, named_color)).parse(input)
}

/// Parses a complete color string.
pub fn parse_color(s: &str) -> Result<Color, StyleParseError> {
    run_parser(color_value, s).map_err(|_| invalid("color", s))
}

// --- Numeric Lists ---

/// Parses a list of numbers separated by commas and/or whitespace.
pub fn parse_number_list(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(alt((ws(char(',')), map(multispace1, |_| ' '))), parse_f64).parse(input)
}

/// Parses a dash array into (dash, gap) pairs. An odd number of values is
/// repeated once so that every dash gets a gap.
pub fn parse_dash_array(s: &str) -> Result<Vec<(f64, f64)>, StyleParseError> {
    let mut values =
        run_parser(parse_number_list, s).map_err(|_| invalid("stroke-dasharray", s))?;
    if values.iter().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(invalid("stroke-dasharray", s));
    }
    if values.len() % 2 == 1 {
        values.extend_from_within(..);
    }
    Ok(values.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, F>(parser: F, input: &'a str) -> Result<T, StyleParseError>
where
    F: Fn(&'a str) -> IResult<&'a str, T>,
{
    match parser(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

// --- Scalar Parse Functions ---

/// Parses a finite floating point attribute value.
/// Parses a finite number. Overflowing literals such as `1e999` are rejected.
pub fn parse_number(property: &str, s: &str) -> Result<f64, StyleParseError> {
    let value = run_parser(parse_f64, s).map_err(|_| {
        StyleParseError::FloatParse(format!("Invalid {} value: {}", property, s))
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(property, s))
    }
}

pub fn parse_unsigned(property: &str, s: &str) -> Result<u32, StyleParseError> {
    s.trim().parse::<u32>().map_err(|_| invalid(property, s))
}

pub fn parse_bool(property: &str, s: &str) -> Result<bool, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(property, s)),
    }
}

/// Parses a single character, as used by `wrap_character`.
pub fn parse_char(property: &str, s: &str) -> Result<char, StyleParseError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(invalid(property, s)),
    }
}

// --- Keyword Parse Functions ---

pub fn parse_line_cap(s: &str) -> Result<LineCap, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "butt" => Ok(LineCap::Butt),
        "round" => Ok(LineCap::Round),
        "square" => Ok(LineCap::Square),
        _ => Err(invalid("stroke-linecap", s)),
    }
}

pub fn parse_line_join(s: &str) -> Result<LineJoin, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "miter" => Ok(LineJoin::Miter),
        "miter_revert" => Ok(LineJoin::MiterRevert),
        "round" => Ok(LineJoin::Round),
        "bevel" => Ok(LineJoin::Bevel),
        _ => Err(invalid("stroke-linejoin", s)),
    }
}

pub fn parse_label_placement(s: &str) -> Result<LabelPlacement, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "point" => Ok(LabelPlacement::Point),
        "line" => Ok(LabelPlacement::Line),
        "vertex" => Ok(LabelPlacement::Vertex),
        _ => Err(invalid("placement", s)),
    }
}

pub fn parse_vertical_alignment(s: &str) -> Result<VerticalAlignment, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "top" => Ok(VerticalAlignment::Top),
        "middle" => Ok(VerticalAlignment::Middle),
        "bottom" => Ok(VerticalAlignment::Bottom),
        _ => Err(invalid("vertical_alignment", s)),
    }
}

pub fn parse_horizontal_alignment(s: &str) -> Result<HorizontalAlignment, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "left" => Ok(HorizontalAlignment::Left),
        "middle" => Ok(HorizontalAlignment::Middle),
        "right" => Ok(HorizontalAlignment::Right),
        _ => Err(invalid("horizontal_alignment", s)),
    }
}

pub fn parse_justify_alignment(s: &str) -> Result<JustifyAlignment, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "left" => Ok(JustifyAlignment::Left),
        "middle" | "center" => Ok(JustifyAlignment::Middle),
        "right" => Ok(JustifyAlignment::Right),
        _ => Err(invalid("justify_alignment", s)),
    }
}

pub fn parse_text_convert(s: &str) -> Result<TextConvert, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "none" => Ok(TextConvert::None),
        "toupper" => Ok(TextConvert::ToUpper),
        "tolower" => Ok(TextConvert::ToLower),
        _ => Err(invalid("text_convert", s)),
    }
}

pub fn parse_pattern_alignment(s: &str) -> Result<PatternAlignment, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "local" => Ok(PatternAlignment::Local),
        "global" => Ok(PatternAlignment::Global),
        _ => Err(invalid("alignment", s)),
    }
}

pub fn parse_raster_mode(s: &str) -> Result<RasterMode, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "normal" => Ok(RasterMode::Normal),
        "grain_merge" => Ok(RasterMode::GrainMerge),
        "grain_merge2" => Ok(RasterMode::GrainMerge2),
        "multiply" => Ok(RasterMode::Multiply),
        "multiply2" => Ok(RasterMode::Multiply2),
        "divide" => Ok(RasterMode::Divide),
        "divide2" => Ok(RasterMode::Divide2),
        "screen" => Ok(RasterMode::Screen),
        "hard_light" => Ok(RasterMode::HardLight),
        _ => Err(invalid("mode", s)),
    }
}

pub fn parse_raster_scaling(s: &str) -> Result<RasterScaling, StyleParseError> {
    match s.trim().to_lowercase().as_str() {
        "fast" => Ok(RasterScaling::Fast),
        "bilinear" => Ok(RasterScaling::Bilinear),
        "bilinear8" => Ok(RasterScaling::Bilinear8),
        _ => Err(invalid("scaling", s)),
    }
}
