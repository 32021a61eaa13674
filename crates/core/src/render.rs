//! Rendering seam.
//!
//! Rasterization lives outside this crate. A [`Renderer`] receives a map and
//! a [`PixelBuffer`]; [`RenderPlan`] does the style bookkeeping every
//! renderer needs: which layers are visible at the current scale, which
//! styles they resolve to, and which rules of those styles are active.

use crate::error::MapError;
use crate::map::{Layer, Map};
use mapstyle_style::Rule;
use mapstyle_types::Color;

/// What a renderer can produce. Replaces global feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererCapabilities {
    pub png: bool,
    pub jpeg: bool,
    pub svg: bool,
    pub pdf: bool,
    pub grid: bool,
}

/// A raw RGBA8 surface, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let i = self.offset(x, y)?;
        let p = &self.data[i..i + 4];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Returns false if `(x, y)` is outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
}

pub trait Renderer {
    fn capabilities(&self) -> RendererCapabilities;

    fn render(&mut self, map: &Map, surface: &mut PixelBuffer) -> Result<(), MapError>;
}

/// A style resolved for a layer, with the rules active at the plan's scale.
#[derive(Debug, Clone)]
pub struct StylePlan<'m> {
    pub name: &'m str,
    pub rules: Vec<&'m Rule>,
}

#[derive(Debug, Clone)]
pub struct LayerPlan<'m> {
    pub layer: &'m Layer,
    pub styles: Vec<StylePlan<'m>>,
}

#[derive(Debug, Clone)]
pub struct RenderPlan<'m> {
    pub scale_denominator: f64,
    pub layers: Vec<LayerPlan<'m>>,
}

impl<'m> RenderPlan<'m> {
    /// Resolves the map at its current scale denominator. Style names that
    /// do not resolve are logged and skipped.
    pub fn build(map: &'m Map) -> Self {
        let scale_denominator = map.scale_denominator();
        let mut layers = Vec::new();
        for layer in map.layers() {
            if !layer.is_visible(scale_denominator) {
                log::debug!(
                    "layer '{}' not visible at 1:{}",
                    layer.name,
                    scale_denominator
                );
                continue;
            }
            let mut styles = Vec::new();
            for name in &layer.styles {
                let Some(style) = map.find_style(name) else {
                    log::warn!("layer '{}' references missing style '{}'", layer.name, name);
                    continue;
                };
                let rules: Vec<&Rule> = style.active_rules(scale_denominator).collect();
                if !rules.is_empty() {
                    styles.push(StylePlan { name, rules });
                }
            }
            layers.push(LayerPlan { layer, styles });
        }
        Self {
            scale_denominator,
            layers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.styles.is_empty())
    }
}

/// Paints only the map background. Useful where a real renderer is not
/// available, e.g. for previews and tests of the rendering seam.
#[derive(Debug, Default)]
pub struct BackgroundRenderer;

impl Renderer for BackgroundRenderer {
    fn capabilities(&self) -> RendererCapabilities {
        RendererCapabilities::default()
    }

    fn render(&mut self, map: &Map, surface: &mut PixelBuffer) -> Result<(), MapError> {
        if surface.width() != map.width || surface.height() != map.height {
            return Err(MapError::Write(format!(
                "surface is {}x{} but the map is {}x{}",
                surface.width(),
                surface.height(),
                map.width,
                map.height
            )));
        }
        surface.fill(map.background.unwrap_or(Color::TRANSPARENT));
        Ok(())
    }
}
