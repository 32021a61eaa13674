use crate::colorizer::RasterColorizer;
use crate::parsers::{parse_number, parse_raster_mode, parse_raster_scaling};
use crate::symbolizer::{AttributeError, AttributeList, SymbolizerAttributes, unknown};
use serde::{Deserialize, Serialize};

/// Compositing mode for raster cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RasterMode {
    #[default]
    Normal,
    GrainMerge,
    GrainMerge2,
    Multiply,
    Multiply2,
    Divide,
    Divide2,
    Screen,
    HardLight,
}

impl RasterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasterMode::Normal => "normal",
            RasterMode::GrainMerge => "grain_merge",
            RasterMode::GrainMerge2 => "grain_merge2",
            RasterMode::Multiply => "multiply",
            RasterMode::Multiply2 => "multiply2",
            RasterMode::Divide => "divide",
            RasterMode::Divide2 => "divide2",
            RasterMode::Screen => "screen",
            RasterMode::HardLight => "hard_light",
        }
    }
}

/// Resampling filter used when the raster is scaled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RasterScaling {
    #[default]
    Fast,
    Bilinear,
    Bilinear8,
}

impl RasterScaling {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasterScaling::Fast => "fast",
            RasterScaling::Bilinear => "bilinear",
            RasterScaling::Bilinear8 => "bilinear8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterSymbolizer {
    pub mode: RasterMode,
    pub scaling: RasterScaling,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorizer: Option<RasterColorizer>,
}

impl Default for RasterSymbolizer {
    fn default() -> Self {
        Self {
            mode: RasterMode::Normal,
            scaling: RasterScaling::Fast,
            opacity: 1.0,
            colorizer: None,
        }
    }
}

impl RasterSymbolizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colorizer(colorizer: RasterColorizer) -> Self {
        Self {
            colorizer: Some(colorizer),
            ..Self::default()
        }
    }
}

impl SymbolizerAttributes for RasterSymbolizer {
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeError> {
        match name {
            "mode" => self.mode = parse_raster_mode(value)?,
            "scaling" => self.scaling = parse_raster_scaling(value)?,
            "opacity" => self.opacity = parse_number(name, value)?,
            _ => return Err(unknown("RasterSymbolizer", name)),
        }
        Ok(())
    }

    fn attribute(&self, name: &str) -> Result<String, AttributeError> {
        Ok(match name {
            "mode" => self.mode.as_str().to_string(),
            "scaling" => self.scaling.as_str().to_string(),
            "opacity" => self.opacity.to_string(),
            _ => return Err(unknown("RasterSymbolizer", name)),
        })
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["mode", "scaling", "opacity"]
    }

    fn write_attributes(&self, explicit_defaults: bool) -> Vec<(&'static str, String)> {
        let mut out = AttributeList::new(explicit_defaults);
        out.push("mode", self.mode.as_str(), self.mode == RasterMode::Normal);
        out.push("scaling", self.scaling.as_str(), self.scaling == RasterScaling::Fast);
        out.push("opacity", self.opacity, self.opacity == 1.0);
        out.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstyle_types::Color;

    #[test]
    fn raster_symbolizer_defaults() {
        let r = RasterSymbolizer::new();
        assert_eq!(r.mode, RasterMode::Normal);
        assert_eq!(r.scaling, RasterScaling::Fast);
        assert_eq!(r.opacity, 1.0);
        assert!(r.colorizer.is_none());
        assert!(r.write_attributes(false).is_empty());
    }

    #[test]
    fn raster_attributes() {
        let mut r = RasterSymbolizer::new();
        r.set_attribute("mode", "multiply").unwrap();
        r.set_attribute("scaling", "bilinear").unwrap();
        r.set_attribute("opacity", "0.5").unwrap();
        assert_eq!(r.attribute("mode").unwrap(), "multiply");
        assert_eq!(r.write_attributes(false).len(), 3);
        assert!(r.set_attribute("mode", "overlay").is_err());
    }

    #[test]
    fn raster_with_colorizer() {
        let mut c = RasterColorizer::new();
        c.append_band(0.0, Color::rgb(255, 0, 0));
        let r = RasterSymbolizer::with_colorizer(c);
        let colorizer = r.colorizer.as_ref().unwrap();
        assert_eq!(colorizer.classify(1.0), Color::rgb(255, 0, 0));
    }
}
