mod common;

use mapstyle::{
    Color, DEFAULT_SRS, Layer, LineSymbolizer, Map, PointSymbolizer, PolygonSymbolizer,
    RasterColorizer, RasterSymbolizer, Rule, Stroke, SymbolizerAttributes, parse_color,
};
use mapstyle_style::{LineCap, LineJoin, RasterMode, RasterScaling};

#[test]
fn new_map_defaults() {
    let map = Map::new(256, 256);
    assert_eq!(map.width, 256);
    assert_eq!(map.height, 256);
    assert_eq!(map.srs, "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs");
    assert_eq!(map.srs, DEFAULT_SRS);
    assert_eq!(map.background, None);
    assert_eq!(map.buffer_size, 0);
    assert_eq!(map.styles().count(), 0);
    assert!(map.layers().is_empty());
}

#[test]
fn new_layer_defaults() {
    let layer = Layer::new("roads", DEFAULT_SRS);
    assert!(layer.active);
    assert!(!layer.queryable);
    assert!(!layer.clear_label_cache);
    assert_eq!(layer.min_zoom, 0.0);
    assert_eq!(layer.max_zoom, f64::INFINITY);
    assert!(layer.datasource.is_none());
}

#[test]
fn stroke_defaults() {
    let stroke = Stroke::new();
    assert_eq!(stroke.color, Color::BLACK);
    assert_eq!(stroke.width, 1.0);
    assert_eq!(stroke.opacity, 1.0);
    assert_eq!(stroke.line_cap, LineCap::Butt);
    assert_eq!(stroke.line_join, LineJoin::Miter);
    assert!(!stroke.has_dash());
}

#[test]
fn symbolizer_defaults() {
    let polygon = PolygonSymbolizer::default();
    assert_eq!(polygon.fill, Color::rgb(128, 128, 128));
    assert_eq!(polygon.fill_opacity, 1.0);

    let point = PointSymbolizer::new();
    assert!(!point.allow_overlap);
    assert_eq!(point.opacity, 1.0);

    let raster = RasterSymbolizer::new();
    assert_eq!(raster.mode, RasterMode::Normal);
    assert_eq!(raster.scaling, RasterScaling::Fast);
    assert!(raster.colorizer.is_none());

    assert_eq!(RasterColorizer::new().default_color, Color::TRANSPARENT);
}

#[test]
fn rule_defaults_cover_every_scale() {
    let rule = Rule::default();
    assert_eq!(rule.min_scale, 0.0);
    assert_eq!(rule.max_scale, f64::INFINITY);
    assert!(rule.filter.is_none());
    assert!(!rule.else_filter);
    assert!(rule.active(0.0));
    assert!(rule.active(1e12));
}

#[test]
fn gray_spellings_agree() {
    let percent = parse_color("rgb(50%,50%,50%)").unwrap();
    assert_eq!(percent, Color::new(128, 128, 128));
    assert_eq!(percent, parse_color("gray").unwrap());
}

#[test]
fn attribute_table_reads_back_values() {
    let mut line = LineSymbolizer::new();
    line.set_attribute("stroke-dasharray", "5,3,2").unwrap();
    assert_eq!(line.attribute("stroke-dasharray").unwrap(), "5, 3, 2, 5, 3, 2");
    line.set_attribute("stroke-linejoin", "round").unwrap();
    assert_eq!(line.stroke.line_join, LineJoin::Round);
    assert!(line.set_attribute("no-such-thing", "1").is_err());
    assert!(line.set_attribute("stroke-width", "wide").is_err());
}
