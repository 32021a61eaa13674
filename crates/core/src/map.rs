//! The map document model: the map itself, its layers and fontsets.

use crate::error::{MapError, ValidationError};
use mapstyle_style::{Style, Symbolizer};
use mapstyle_traits::{DatasourceRegistry, Feature, Parameters};
use mapstyle_types::{Box2d, Color, Coord};
use serde::Serialize;
use std::collections::BTreeMap;

/// The srs of new maps and layers.
pub const DEFAULT_SRS: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Size of a rendered pixel in meters, used for scale denominators.
const PIXEL_SIZE_M: f64 = 0.28e-3;

/// Meters per degree at the WGS84 equator.
const METERS_PER_DEGREE: f64 = 6_378_137.0 * 2.0 * std::f64::consts::PI / 360.0;

/// Returns true for srs definitions with angular units.
pub fn is_geographic(srs: &str) -> bool {
    let srs = srs.to_lowercase();
    srs.contains("+proj=longlat") || srs.contains("+proj=latlong") || srs.contains("epsg:4326")
}

/// An ordered list of font faces tried in turn when rendering labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontSet {
    pub face_names: Vec<String>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_face_name(&mut self, face_name: &str) {
        self.face_names.push(face_name.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub srs: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub active: bool,
    pub queryable: bool,
    pub clear_label_cache: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Parameters handed to a [`DatasourceRegistry`]; `None` for layers
    /// without data.
    pub datasource: Option<Parameters>,
    /// Names of styles in the owning map, resolved when rendering.
    pub styles: Vec<String>,
}

impl Layer {
    pub fn new(name: &str, srs: &str) -> Self {
        Self {
            name: name.to_string(),
            srs: srs.to_string(),
            title: String::new(),
            abstract_: String::new(),
            active: true,
            queryable: false,
            clear_label_cache: false,
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            datasource: None,
            styles: Vec::new(),
        }
    }

    pub fn add_style(&mut self, name: &str) {
        self.styles.push(name.to_string());
    }

    pub fn set_datasource(&mut self, params: Parameters) {
        self.datasource = Some(params);
    }

    /// Active and `min_zoom <= scale < max_zoom`.
    pub fn is_visible(&self, scale: f64) -> bool {
        self.active && scale >= self.min_zoom && scale < self.max_zoom
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub srs: String,
    pub background: Option<Color>,
    pub background_image: Option<String>,
    pub buffer_size: u32,
    styles: BTreeMap<String, Style>,
    fontsets: BTreeMap<String, FontSet>,
    layers: Vec<Layer>,
    #[serde(skip)]
    current_extent: Box2d,
}

impl Default for Map {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl Map {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            srs: DEFAULT_SRS.to_string(),
            background: None,
            background_image: None,
            buffer_size: 0,
            styles: BTreeMap::new(),
            fontsets: BTreeMap::new(),
            layers: Vec::new(),
            current_extent: Box2d::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    // --- Styles ---

    /// Adds a style under `name`. Returns false, leaving the existing style
    /// in place, if the name is taken.
    pub fn append_style(&mut self, name: &str, style: Style) -> bool {
        if self.styles.contains_key(name) {
            return false;
        }
        self.styles.insert(name.to_string(), style);
        true
    }

    pub fn remove_style(&mut self, name: &str) -> Option<Style> {
        self.styles.remove(name)
    }

    pub fn find_style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn find_style_mut(&mut self, name: &str) -> Option<&mut Style> {
        self.styles.get_mut(name)
    }

    /// Styles in name order.
    pub fn styles(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v))
    }

    // --- Fontsets ---

    pub fn insert_fontset(&mut self, name: &str, fontset: FontSet) -> bool {
        if self.fontsets.contains_key(name) {
            return false;
        }
        self.fontsets.insert(name.to_string(), fontset);
        true
    }

    pub fn find_fontset(&self, name: &str) -> Option<&FontSet> {
        self.fontsets.get(name)
    }

    pub fn fontsets(&self) -> impl Iterator<Item = (&str, &FontSet)> {
        self.fontsets.iter().map(|(k, v)| (k.as_str(), v))
    }

    // --- Layers ---

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<Layer> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    // --- Extent and scale ---

    pub fn current_extent(&self) -> Box2d {
        self.current_extent
    }

    /// Shows `bbox`, growing it about its center to match the map's aspect
    /// ratio.
    pub fn zoom_to_box(&mut self, bbox: Box2d) {
        let mut extent = bbox;
        if self.width > 0 && self.height > 0 && bbox.width() > 0.0 && bbox.height() > 0.0 {
            let map_ratio = self.width as f64 / self.height as f64;
            let box_ratio = bbox.width() / bbox.height();
            if box_ratio > map_ratio {
                extent.set_size(bbox.width(), bbox.width() / map_ratio);
            } else if box_ratio < map_ratio {
                extent.set_size(bbox.height() * map_ratio, bbox.height());
            }
        }
        log::debug!("zoom to {:?} (requested {:?})", extent, bbox);
        self.current_extent = extent;
    }

    /// Zooms to the union of all layer envelopes.
    pub fn zoom_all(&mut self, registry: &DatasourceRegistry) -> Result<(), MapError> {
        let mut extent: Option<Box2d> = None;
        for layer in self.layers.iter().filter(|l| l.active) {
            let Some(params) = &layer.datasource else {
                continue;
            };
            if layer.srs != self.srs {
                return Err(MapError::Projection {
                    layer_srs: layer.srs.clone(),
                    map_srs: self.srs.clone(),
                });
            }
            let envelope = registry.create(params)?.envelope();
            match extent.as_mut() {
                Some(e) => e.expand_to_include(&envelope),
                None => extent = Some(envelope),
            }
        }
        if let Some(e) = extent {
            self.zoom_to_box(e);
        }
        Ok(())
    }

    /// Map units per pixel.
    pub fn scale(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.current_extent.width() / self.width as f64
    }

    /// The scale denominator for the current extent, assuming 0.28mm pixels.
    pub fn scale_denominator(&self) -> f64 {
        let scale = self.scale();
        if is_geographic(&self.srs) {
            scale * METERS_PER_DEGREE / PIXEL_SIZE_M
        } else {
            scale / PIXEL_SIZE_M
        }
    }

    // --- Consistency ---

    /// Collects every missing style, inverted scale range and missing fontset.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for layer in &self.layers {
            for style in &layer.styles {
                if !self.styles.contains_key(style) {
                    errors.push(ValidationError::MissingStyle {
                        layer: layer.name.clone(),
                        style: style.clone(),
                    });
                }
            }
        }
        for (style_name, style) in &self.styles {
            for rule in &style.rules {
                if rule.min_scale > rule.max_scale {
                    errors.push(ValidationError::InvalidScaleRange {
                        style: style_name.clone(),
                        rule: rule.name.clone(),
                        min: rule.min_scale,
                        max: rule.max_scale,
                    });
                }
                for sym in &rule.symbolizers {
                    if let Some(Err(problem)) = sym.text_properties().map(|t| t.check_font_source()) {
                        errors.push(ValidationError::FontSource {
                            style: style_name.clone(),
                            rule: rule.name.clone(),
                            problem,
                        });
                    }
                    let fontset = match sym {
                        Symbolizer::Text(t) => t.properties.fontset_name.as_ref(),
                        Symbolizer::Shield(s) => s.text.fontset_name.as_ref(),
                        _ => None,
                    };
                    if let Some(fontset) = fontset.filter(|f| !self.fontsets.contains_key(*f)) {
                        errors.push(ValidationError::MissingFontset {
                            style: style_name.clone(),
                            fontset: fontset.clone(),
                        });
                    }
                }
            }
        }
        errors
    }

    /// Like [`Map::validate`], failing on the first problem.
    pub fn ensure_valid(&self) -> Result<(), MapError> {
        match self.validate().into_iter().next() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    // --- Queries ---

    /// Features of a layer's datasource at a point in map coordinates.
    pub fn query_point(
        &self,
        layer_index: usize,
        x: f64,
        y: f64,
        registry: &DatasourceRegistry,
    ) -> Result<Vec<Feature>, MapError> {
        let layer = self
            .layers
            .get(layer_index)
            .ok_or(MapError::LayerNotFound(layer_index))?;
        if layer.srs != self.srs {
            return Err(MapError::Projection {
                layer_srs: layer.srs.clone(),
                map_srs: self.srs.clone(),
            });
        }
        let params = layer
            .datasource
            .as_ref()
            .ok_or_else(|| MapError::NoDatasource(layer.name.clone()))?;
        let datasource = registry.create(params)?;
        Ok(datasource.features_at_point(Coord::new(x, y))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstyle_style::{Expression, Rule, TextSymbolizer};

    fn memory_params(inline: &str) -> Parameters {
        let mut p = Parameters::new();
        p.insert("type".into(), "memory".into());
        p.insert("inline".into(), inline.into());
        p
    }

    #[test]
    fn map_defaults() {
        let m = Map::new(256, 256);
        assert_eq!(m.width, 256);
        assert_eq!(m.height, 256);
        assert_eq!(m.srs, "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs");
        assert!(m.background.is_none());
        assert_eq!(m.buffer_size, 0);
        assert_eq!(m.layers().len(), 0);
        assert_eq!(m.styles().count(), 0);
    }

    #[test]
    fn layer_defaults() {
        let l = Layer::new("test", DEFAULT_SRS);
        assert_eq!(l.name, "test");
        assert_eq!(l.srs, DEFAULT_SRS);
        assert_eq!(l.title, "");
        assert_eq!(l.abstract_, "");
        assert!(l.active);
        assert!(!l.queryable);
        assert!(!l.clear_label_cache);
        assert_eq!(l.min_zoom, 0.0);
        assert_eq!(l.max_zoom, f64::INFINITY);
        assert!(l.styles.is_empty());
    }

    #[test]
    fn layer_visibility() {
        let mut l = Layer::new("test", DEFAULT_SRS);
        l.min_zoom = 100.0;
        l.max_zoom = 1000.0;
        assert!(!l.is_visible(99.0));
        assert!(l.is_visible(100.0));
        assert!(!l.is_visible(1000.0));
        l.active = false;
        assert!(!l.is_visible(500.0));
    }

    #[test]
    fn first_style_wins() {
        let mut m = Map::default();
        assert!(m.append_style("s", Style::new()));
        let mut other = Style::new();
        other.add_rule(Rule::default());
        assert!(!m.append_style("s", other));
        assert!(m.find_style("s").unwrap().rules.is_empty());
        assert!(m.remove_style("s").is_some());
        assert!(m.find_style("s").is_none());
    }

    #[test]
    fn layers_are_ordered() {
        let mut m = Map::default();
        m.add_layer(Layer::new("a", DEFAULT_SRS));
        m.add_layer(Layer::new("b", DEFAULT_SRS));
        assert_eq!(m.layer(1).unwrap().name, "b");
        assert_eq!(m.remove_layer(0).unwrap().name, "a");
        assert_eq!(m.layer(0).unwrap().name, "b");
        assert!(m.remove_layer(3).is_none());
    }

    #[test]
    fn zoom_grows_to_aspect_ratio() {
        let mut m = Map::new(200, 100);
        m.zoom_to_box(Box2d::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(m.current_extent(), Box2d::new(-5.0, 0.0, 15.0, 10.0));

        m.zoom_to_box(Box2d::new(0.0, 0.0, 40.0, 10.0));
        assert_eq!(m.current_extent(), Box2d::new(0.0, -5.0, 40.0, 15.0));
        assert_eq!(m.scale(), 0.2);
    }

    #[test]
    fn scale_denominator_in_projected_and_geographic_srs() {
        let mut m = Map::new(256, 256);
        m.srs = "+proj=merc +a=6378137 +b=6378137 +units=m".into();
        m.zoom_to_box(Box2d::new(0.0, 0.0, 256.0 * 0.28, 256.0 * 0.28));
        assert!((m.scale_denominator() - 1000.0).abs() < 1e-6);

        m.srs = DEFAULT_SRS.into();
        m.zoom_to_box(Box2d::new(-180.0, -180.0, 180.0, 180.0));
        let expected = (360.0 / 256.0) * METERS_PER_DEGREE / PIXEL_SIZE_M;
        assert!((m.scale_denominator() - expected).abs() < 1e-3);
    }

    #[test]
    fn validation_reports_problems() {
        let mut m = Map::default();
        let mut style = Style::new();
        style.add_rule(Rule::new("bad", "", 10.0, 5.0));
        let mut labels = Rule::default();
        let mut text = TextSymbolizer::new(
            Expression::parse("[name]").unwrap(),
            "DejaVu Sans Book",
            10.0,
            Color::BLACK,
        );
        text.properties.face_name = None;
        text.properties.fontset_name = Some("missing".into());
        labels.append(text);
        style.add_rule(labels);
        m.append_style("roads", style);
        let mut layer = Layer::new("roads", DEFAULT_SRS);
        layer.add_style("roads");
        layer.add_style("nope");
        m.add_layer(layer);

        let errors = m.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingStyle {
            layer: "roads".into(),
            style: "nope".into()
        }));
        assert!(errors.contains(&ValidationError::MissingFontset {
            style: "roads".into(),
            fontset: "missing".into()
        }));
        assert!(matches!(m.ensure_valid(), Err(MapError::Validation(_))));

        m.insert_fontset("missing", FontSet::new());
        assert_eq!(m.validate().len(), 2);
    }

    #[test]
    fn validate_reports_labels_without_a_font() {
        let mut m = Map::default();
        let mut rule = Rule::new("labels", "", 0.0, f64::INFINITY);
        rule.append(TextSymbolizer::default());
        let mut style = Style::new();
        style.add_rule(rule);
        m.append_style("places", style);
        assert_eq!(
            m.validate(),
            vec![ValidationError::FontSource {
                style: "places".into(),
                rule: "labels".into(),
                problem: mapstyle_style::FontSourceError::Missing,
            }]
        );
    }

    #[test]
    fn query_point_through_registry() {
        let registry = DatasourceRegistry::with_builtins();
        let mut m = Map::default();
        let mut layer = Layer::new("pois", DEFAULT_SRS);
        layer.set_datasource(memory_params(
            r#"[{"id": 1, "envelope": {"minx": 0, "miny": 0, "maxx": 1, "maxy": 1},
                 "properties": {"name": "here"}}]"#,
        ));
        m.add_layer(layer);
        m.add_layer(Layer::new("empty", DEFAULT_SRS));
        let mut projected = Layer::new("merc", "+proj=merc");
        projected.set_datasource(memory_params("[]"));
        m.add_layer(projected);

        let hits = m.query_point(0, 0.5, 0.5, &registry).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(m.query_point(0, 5.0, 5.0, &registry).unwrap().is_empty());
        assert!(matches!(
            m.query_point(1, 0.0, 0.0, &registry),
            Err(MapError::NoDatasource(_))
        ));
        assert!(matches!(
            m.query_point(2, 0.0, 0.0, &registry),
            Err(MapError::Projection { .. })
        ));
        assert!(matches!(
            m.query_point(9, 0.0, 0.0, &registry),
            Err(MapError::LayerNotFound(9))
        ));
    }

    #[test]
    fn zoom_all_covers_layers() {
        let registry = DatasourceRegistry::with_builtins();
        let mut m = Map::new(100, 100);
        let mut layer = Layer::new("pois", DEFAULT_SRS);
        layer.set_datasource(memory_params(
            r#"[{"id": 1, "envelope": {"minx": 0, "miny": 0, "maxx": 10, "maxy": 10}},
                {"id": 2, "envelope": {"minx": 20, "miny": 20, "maxx": 30, "maxy": 30}}]"#,
        ));
        m.add_layer(layer);
        m.zoom_all(&registry).unwrap();
        assert_eq!(m.current_extent(), Box2d::new(0.0, 0.0, 30.0, 30.0));
    }
}
