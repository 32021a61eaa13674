//! Maps raster cell values to colors through ordered threshold bands.

use mapstyle_types::Color;
use serde::{Deserialize, Serialize};

/// A threshold and the color used for values at or above it.
///
/// `midpoints` asks for that many evenly spaced interpolated steps between
/// this band and the next one. Values above `max_value`, when set, fall
/// outside the band and get the default color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    pub value: f64,
    pub color: Color,
    #[serde(default)]
    pub midpoints: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl ColorBand {
    pub fn new(value: f64, color: Color) -> Self {
        Self {
            value,
            color,
            midpoints: 0,
            max_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterColorizer {
    bands: Vec<ColorBand>,
    /// Used for values below every band, for NaN and when there are no bands.
    pub default_color: Color,
}

impl Default for RasterColorizer {
    fn default() -> Self {
        Self {
            bands: Vec::new(),
            default_color: Color::TRANSPARENT,
        }
    }
}

impl RasterColorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_color(default_color: Color) -> Self {
        Self {
            bands: Vec::new(),
            default_color,
        }
    }

    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    pub fn append_band(&mut self, value: f64, color: Color) {
        self.insert(ColorBand::new(value, color));
    }

    pub fn append_band_with_midpoints(&mut self, value: f64, color: Color, midpoints: u32) {
        self.insert(ColorBand {
            midpoints,
            ..ColorBand::new(value, color)
        });
    }

    /// Appends a band that only covers values up to `max_value`.
    pub fn append_band_range(&mut self, value: f64, max_value: f64, color: Color, midpoints: u32) {
        self.insert(ColorBand {
            midpoints,
            max_value: Some(max_value),
            ..ColorBand::new(value, color)
        });
    }

    pub fn append(&mut self, band: ColorBand) {
        self.insert(band);
    }

    /// Keeps bands sorted by threshold. A band is placed after any existing
    /// band with the same threshold so the later append wins on lookup.
    fn insert(&mut self, band: ColorBand) {
        let at = self.bands.partition_point(|b| b.value <= band.value);
        if at > 0 && self.bands[at - 1].value == band.value {
            log::debug!("color band at {} shadows an earlier band", band.value);
        }
        self.bands.insert(at, band);
    }

    /// The color of the greatest threshold not above `value`.
    pub fn classify(&self, value: f64) -> Color {
        if value.is_nan() {
            return self.default_color;
        }
        let idx = self.bands.partition_point(|b| b.value <= value);
        if idx == 0 {
            return self.default_color;
        }
        let band = &self.bands[idx - 1];
        if band.max_value.is_some_and(|max| value > max) {
            return self.default_color;
        }
        match self.bands.get(idx) {
            Some(next) if band.midpoints > 0 => {
                let steps = band.midpoints as f64 + 1.0;
                let t = (value - band.value) / (next.value - band.value);
                let step = (t * steps).floor().min(steps - 1.0);
                lerp(band.color, next.color, step / steps)
            }
            _ => band.color,
        }
    }

    /// Classifies every value into an RGBA buffer, four bytes per value.
    /// Cells equal to `nodata` are fully transparent.
    pub fn colorize(&self, values: &[f64], nodata: Option<f64>) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(values.len() * 4);
        for &v in values {
            let c = match nodata {
                Some(nd) if v == nd => Color::TRANSPARENT,
                _ => self.classify(v),
            };
            rgba.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        rgba
    }
}

fn lerp(a: Color, b: Color, t: f64) -> Color {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}
