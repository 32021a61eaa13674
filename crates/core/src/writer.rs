//! Map document saving with `quick_xml`.
//!
//! Only values that differ from their defaults are written unless
//! `explicit_defaults` is set, so saved documents stay close to what a
//! person would write by hand.

use crate::error::{MapError, ValidationError};
use crate::map::{FontSet, Layer, Map};
use mapstyle_style::{RasterColorizer, Rule, Symbolizer, SymbolizerAttributes};
use mapstyle_types::Color;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;

type XmlWriter = Writer<Vec<u8>>;

fn write_err(e: impl std::fmt::Display) -> MapError {
    MapError::Write(e.to_string())
}

fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), MapError> {
    let mut elem = BytesStart::new(name);
    for (k, v) in attrs {
        elem.push_attribute((*k, v.as_str()));
    }
    writer.write_event(Event::Start(elem)).map_err(write_err)
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), MapError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_err)
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), MapError> {
    let mut elem = BytesStart::new(name);
    for (k, v) in attrs {
        elem.push_attribute((*k, v.as_str()));
    }
    writer.write_event(Event::Empty(elem)).map_err(write_err)
}

fn text_element(
    writer: &mut XmlWriter,
    name: &str,
    attrs: &[(&str, String)],
    text: &str,
) -> Result<(), MapError> {
    start(writer, name, attrs)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_err)?;
    end(writer, name)
}

/// Serializes `map` to a document string.
pub fn save_map_to_string(map: &Map, explicit_defaults: bool) -> Result<String, MapError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_err)?;

    start(&mut writer, "Map", &map_attributes(map, explicit_defaults))?;
    for (name, fontset) in map.fontsets() {
        write_fontset(&mut writer, name, fontset)?;
    }
    for (name, style) in map.styles() {
        start(&mut writer, "Style", &[("name", name.to_string())])?;
        for rule in &style.rules {
            write_rule(&mut writer, name, rule, explicit_defaults)?;
        }
        end(&mut writer, "Style")?;
    }
    for layer in map.layers() {
        write_layer(&mut writer, layer, &map.srs, explicit_defaults)?;
    }
    end(&mut writer, "Map")?;

    log::debug!(
        "saved map: {} styles, {} layers",
        map.styles().count(),
        map.layers().len()
    );
    String::from_utf8(writer.into_inner()).map_err(write_err)
}

/// Serializes `map` and writes it to `path`.
pub fn save_map(map: &Map, path: &Path, explicit_defaults: bool) -> Result<(), MapError> {
    let xml = save_map_to_string(map, explicit_defaults)?;
    std::fs::write(path, xml)?;
    Ok(())
}

fn map_attributes(map: &Map, explicit_defaults: bool) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("srs", map.srs.clone())];
    if let Some(bg) = map.background {
        attrs.push(("background-color", bg.to_css_string()));
    }
    if let Some(image) = &map.background_image {
        attrs.push(("background-image", image.clone()));
    }
    if explicit_defaults || map.buffer_size != 0 {
        attrs.push(("buffer_size", map.buffer_size.to_string()));
    }
    attrs
}

fn write_fontset(writer: &mut XmlWriter, name: &str, fontset: &FontSet) -> Result<(), MapError> {
    start(writer, "FontSet", &[("name", name.to_string())])?;
    for face in &fontset.face_names {
        empty(writer, "Font", &[("face_name", face.clone())])?;
    }
    end(writer, "FontSet")
}

fn write_rule(
    writer: &mut XmlWriter,
    style: &str,
    rule: &Rule,
    explicit_defaults: bool,
) -> Result<(), MapError> {
    let mut attrs = Vec::new();
    if explicit_defaults || !rule.name.is_empty() {
        attrs.push(("name", rule.name.clone()));
    }
    if explicit_defaults || !rule.title.is_empty() {
        attrs.push(("title", rule.title.clone()));
    }
    start(writer, "Rule", &attrs)?;

    if let Some(filter) = &rule.filter {
        text_element(writer, "Filter", &[], filter.as_str())?;
    }
    if rule.else_filter {
        empty(writer, "ElseFilter", &[])?;
    }
    if explicit_defaults || rule.min_scale != 0.0 {
        text_element(writer, "MinScaleDenominator", &[], &rule.min_scale.to_string())?;
    }
    // An unbounded maximum has no document form.
    if rule.max_scale.is_finite() {
        text_element(writer, "MaxScaleDenominator", &[], &rule.max_scale.to_string())?;
    }
    for symbolizer in &rule.symbolizers {
        // A label without exactly one font source would not load again.
        if let Some(Err(problem)) = symbolizer.text_properties().map(|t| t.check_font_source()) {
            return Err(ValidationError::FontSource {
                style: style.to_string(),
                rule: rule.name.clone(),
                problem,
            }
            .into());
        }
        write_symbolizer(writer, symbolizer, explicit_defaults)?;
    }
    end(writer, "Rule")
}

fn write_symbolizer(
    writer: &mut XmlWriter,
    symbolizer: &Symbolizer,
    explicit_defaults: bool,
) -> Result<(), MapError> {
    let name = symbolizer.element_name();
    let attrs = symbolizer.write_attributes(explicit_defaults);
    match symbolizer {
        Symbolizer::Raster(raster) => match &raster.colorizer {
            Some(colorizer) => {
                start(writer, name, &attrs)?;
                write_colorizer(writer, colorizer, explicit_defaults)?;
                end(writer, name)
            }
            None => empty(writer, name, &attrs),
        },
        _ => empty(writer, name, &attrs),
    }
}

fn write_colorizer(
    writer: &mut XmlWriter,
    colorizer: &RasterColorizer,
    explicit_defaults: bool,
) -> Result<(), MapError> {
    let mut attrs = Vec::new();
    if explicit_defaults || colorizer.default_color != Color::TRANSPARENT {
        attrs.push(("default-color", colorizer.default_color.to_css_string()));
    }
    start(writer, "RasterColorizer", &attrs)?;
    for band in colorizer.bands() {
        let mut attrs = vec![
            ("value", band.value.to_string()),
            ("color", band.color.to_css_string()),
        ];
        if explicit_defaults || band.midpoints != 0 {
            attrs.push(("midpoints", band.midpoints.to_string()));
        }
        if let Some(max) = band.max_value {
            attrs.push(("max_value", max.to_string()));
        }
        empty(writer, "ColorBand", &attrs)?;
    }
    end(writer, "RasterColorizer")
}

fn write_layer(
    writer: &mut XmlWriter,
    layer: &Layer,
    map_srs: &str,
    explicit_defaults: bool,
) -> Result<(), MapError> {
    let mut attrs = vec![("name", layer.name.clone())];
    // Layers inherit the map srs when it is omitted.
    if explicit_defaults || layer.srs != map_srs {
        attrs.push(("srs", layer.srs.clone()));
    }
    if explicit_defaults || !layer.title.is_empty() {
        attrs.push(("title", layer.title.clone()));
    }
    if explicit_defaults || !layer.abstract_.is_empty() {
        attrs.push(("abstract", layer.abstract_.clone()));
    }
    if explicit_defaults || !layer.active {
        attrs.push(("status", layer.active.to_string()));
    }
    if explicit_defaults || layer.queryable {
        attrs.push(("queryable", layer.queryable.to_string()));
    }
    if explicit_defaults || layer.clear_label_cache {
        attrs.push(("clear_label_cache", layer.clear_label_cache.to_string()));
    }
    if explicit_defaults || layer.min_zoom != 0.0 {
        attrs.push(("minzoom", layer.min_zoom.to_string()));
    }
    if layer.max_zoom.is_finite() {
        attrs.push(("maxzoom", layer.max_zoom.to_string()));
    }

    start(writer, "Layer", &attrs)?;
    for style in &layer.styles {
        text_element(writer, "StyleName", &[], style)?;
    }
    if let Some(params) = &layer.datasource {
        start(writer, "Datasource", &[])?;
        for (key, value) in params {
            text_element(writer, "Parameter", &[("name", key.clone())], value)?;
        }
        end(writer, "Datasource")?;
    }
    end(writer, "Layer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::DEFAULT_SRS;
    use mapstyle_style::{
        Expression, FontSourceError, LineSymbolizer, ShieldSymbolizer, Style, TextSymbolizer,
    };

    #[test]
    fn empty_map_document() {
        let xml = save_map_to_string(&Map::default(), false).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(&format!("<Map srs=\"{}\">", DEFAULT_SRS)));
        assert!(xml.trim_end().ends_with("</Map>"));
        assert!(!xml.contains("buffer_size"));
        assert!(save_map_to_string(&Map::default(), true).unwrap().contains("buffer_size=\"0\""));
    }

    #[test]
    fn rule_scale_bounds() {
        let mut rule = Rule::new("r", "", 0.0, 5000.0);
        rule.append(LineSymbolizer::new());
        let mut style = Style::new();
        style.add_rule(rule);
        let mut map = Map::default();
        map.append_style("s", style);

        let xml = save_map_to_string(&map, false).unwrap();
        assert!(xml.contains("<MaxScaleDenominator>5000</MaxScaleDenominator>"));
        assert!(!xml.contains("MinScaleDenominator"));
        assert!(xml.contains("<LineSymbolizer/>"));
    }

    #[test]
    fn layer_srs_written_only_when_different() {
        let mut map = Map::default();
        map.add_layer(Layer::new("same", DEFAULT_SRS));
        map.add_layer(Layer::new("other", "+init=epsg:3857"));
        let xml = save_map_to_string(&map, false).unwrap();
        assert!(xml.contains("<Layer name=\"same\">"));
        assert!(xml.contains("<Layer name=\"other\" srs=\"+init=epsg:3857\">"));
    }

    #[test]
    fn text_is_escaped() {
        let mut rule = Rule::default();
        rule.set_filter(mapstyle_style::Expression::parse("[a] < 3 and [b] > 4").unwrap());
        let mut style = Style::new();
        style.add_rule(rule);
        let mut map = Map::default();
        map.append_style("s", style);
        let xml = save_map_to_string(&map, false).unwrap();
        assert!(xml.contains("<Filter>[a] &lt; 3 and [b] &gt; 4</Filter>"));
    }

    fn map_with(symbolizer: impl Into<Symbolizer>) -> Map {
        let mut rule = Rule::new("labels", "", 0.0, f64::INFINITY);
        rule.append(symbolizer);
        let mut style = Style::new();
        style.add_rule(rule);
        let mut map = Map::default();
        map.append_style("places", style);
        map
    }

    fn font_problem(map: &Map) -> Option<FontSourceError> {
        match save_map_to_string(map, false) {
            Err(MapError::Validation(ValidationError::FontSource { style, rule, problem })) => {
                assert_eq!(style, "places");
                assert_eq!(rule, "labels");
                Some(problem)
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => None,
        }
    }

    #[test]
    fn labels_without_one_font_source_are_not_saved() {
        assert_eq!(
            font_problem(&map_with(TextSymbolizer::default())),
            Some(FontSourceError::Missing)
        );
        assert_eq!(
            font_problem(&map_with(ShieldSymbolizer::default())),
            Some(FontSourceError::Missing)
        );

        let name = Expression::parse("[name]").unwrap();
        let mut both = TextSymbolizer::new(name.clone(), "DejaVu Sans Book", 10.0, Color::BLACK);
        both.properties.fontset_name = Some("book-fonts".into());
        assert_eq!(font_problem(&map_with(both)), Some(FontSourceError::Conflicting));

        let face = TextSymbolizer::new(name.clone(), "DejaVu Sans Book", 10.0, Color::BLACK);
        assert_eq!(font_problem(&map_with(face)), None);
        let mut fontset = ShieldSymbolizer::default();
        fontset.text.name = name;
        fontset.text.fontset_name = Some("book-fonts".into());
        fontset.file = "shield.png".into();
        assert_eq!(font_problem(&map_with(fontset)), None);
    }
}
