use mapstyle_types::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum LineJoin {
    #[default]
    Miter,
    MiterRevert,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::MiterRevert => "miter_revert",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Paint attributes for a line. The dash array is a sequence of
/// (dash, gap) lengths applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dash_array: Vec<(f64, f64)>,
    pub dash_offset: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            opacity: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    pub fn add_dash(&mut self, dash: f64, gap: f64) {
        self.dash_array.push((dash, gap));
    }

    pub fn dashes(&self) -> &[(f64, f64)] {
        &self.dash_array
    }

    pub fn has_dash(&self) -> bool {
        !self.dash_array.is_empty()
    }

    pub fn set_dashes(&mut self, dashes: Vec<(f64, f64)>) {
        self.dash_array = dashes;
    }

    pub fn clear_dashes(&mut self) {
        self.dash_array.clear();
    }

    /// The dash array in document form, e.g. `5, 3, 1, 2`.
    pub fn dash_array_string(&self) -> String {
        self.dash_array
            .iter()
            .flat_map(|(d, g)| [*d, *g])
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
