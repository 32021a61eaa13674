use super::{DOCUMENT_VERSION, LoadOptions, LoadWarning};
use crate::error::{Location, ParseError};
use crate::map::{FontSet, Layer, Map};
use mapstyle_style::parsers::{parse_bool, parse_color, parse_number, parse_unsigned};
use mapstyle_style::{Expression, Rule, Style, StyleParseError};
use mapstyle_traits::Parameters;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::path::Path;

const MAP_ATTRIBUTES: &[&str] = &[
    "srs",
    "background-color",
    "bgcolor",
    "background-image",
    "buffer_size",
    "paths_from_xml",
    "minimum_version",
];

const LAYER_ATTRIBUTES: &[&str] = &[
    "name",
    "srs",
    "title",
    "abstract",
    "status",
    "queryable",
    "clear_label_cache",
    "minzoom",
    "maxzoom",
];

/// Converts a node's byte offset into a line/column location.
pub(super) fn location(node: Node) -> Location {
    let pos = node.document().text_pos_at(node.range().start);
    Location {
        line: pos.row as usize,
        col: pos.col as usize,
    }
}

pub(super) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// The concatenated text content of an element, as written.
pub(super) fn raw_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// The concatenated text content of an element, trimmed.
pub(super) fn element_text(node: Node) -> String {
    raw_text(node).trim().to_string()
}

pub(super) fn unknown_element(node: Node) -> ParseError {
    ParseError::UnknownElement {
        element: node.tag_name().name().to_string(),
        location: location(node),
    }
}

pub(super) fn invalid_value(node: Node, attribute: &str, value: &str, message: String) -> ParseError {
    ParseError::InvalidValue {
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        message,
        location: location(node),
    }
}

pub(super) fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, ParseError> {
    node.attribute(name)
        .ok_or_else(|| ParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
            location: location(node),
        })
}

/// Parses an optional attribute with one of the style value parsers.
pub(super) fn parse_attr<T>(
    node: Node,
    name: &str,
    parse: impl Fn(&str) -> Result<T, StyleParseError>,
) -> Result<Option<T>, ParseError> {
    match node.attribute(name) {
        Some(value) => parse(value)
            .map(Some)
            .map_err(|e| invalid_value(node, name, value, e.to_string())),
        None => Ok(None),
    }
}

pub(super) fn parse_required_attr<T>(
    node: Node,
    name: &str,
    parse: impl Fn(&str) -> Result<T, StyleParseError>,
) -> Result<T, ParseError> {
    let value = required_attr(node, name)?;
    parse(value).map_err(|e| invalid_value(node, name, value, e.to_string()))
}

/// `major * 100000 + minor * 100 + patch`, or `None` if not `x.y.z`.
fn version_number(version: &str) -> Option<u64> {
    let parts = version
        .split('.')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [major, minor, patch] => Some(major * 100_000 + minor * 100 + patch),
        _ => None,
    }
}

pub(super) struct MapParser<'o> {
    options: &'o LoadOptions,
    paths_from_xml: bool,
    file_sources: BTreeMap<String, String>,
    datasource_templates: BTreeMap<String, Parameters>,
    pub(super) warnings: Vec<LoadWarning>,
}

impl<'o> MapParser<'o> {
    pub(super) fn new(options: &'o LoadOptions) -> Self {
        Self {
            options,
            paths_from_xml: true,
            file_sources: BTreeMap::new(),
            datasource_templates: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub(super) fn parse_document(&mut self, doc: &Document, map: &mut Map) -> Result<(), ParseError> {
        let root = doc.root_element();
        if root.tag_name().name() != "Map" {
            return Err(ParseError::MissingMapRoot(root.tag_name().name().to_string()));
        }
        self.parse_map_attributes(root, map)?;
        self.parse_map_children(root, map)
    }

    // --- Diagnostics ---

    pub(super) fn warn(&mut self, node: Node, message: String) {
        let location = location(node);
        log::warn!("{} ({})", message, location);
        self.warnings.push(LoadWarning { message, location });
    }

    /// Strict mode fails; lenient mode records a warning and moves on.
    pub(super) fn unknown_attribute(&mut self, node: Node, attribute: &str) -> Result<(), ParseError> {
        if self.options.strict {
            return Err(ParseError::UnknownAttribute {
                element: node.tag_name().name().to_string(),
                attribute: attribute.to_string(),
                location: location(node),
            });
        }
        self.warn(
            node,
            format!(
                "Ignoring unknown attribute '{}' on <{}>",
                attribute,
                node.tag_name().name()
            ),
        );
        Ok(())
    }

    pub(super) fn check_attributes(&mut self, node: Node, known: &[&str]) -> Result<(), ParseError> {
        for attr in node.attributes() {
            if !known.contains(&attr.name()) {
                self.unknown_attribute(node, attr.name())?;
            }
        }
        Ok(())
    }

    fn duplicate(&mut self, node: Node, kind: &str, name: &str) -> Result<(), ParseError> {
        let message = format!("Duplicate {} name '{}'; keeping the first definition", kind, name);
        if self.options.strict {
            return Err(ParseError::Structure {
                message,
                location: location(node),
            });
        }
        self.warn(node, message);
        Ok(())
    }

    // --- Paths ---

    fn relative_to_document(&self, path: &str) -> String {
        match &self.options.base_path {
            Some(base) if self.paths_from_xml && Path::new(path).is_relative() => {
                base.join(path).to_string_lossy().into_owned()
            }
            _ => path.to_string(),
        }
    }

    /// Prefixes `file` with its named `FileSource`, then makes it relative
    /// to the document.
    pub(super) fn resolve_path(&mut self, node: Node, file: &str, base: Option<&str>) -> String {
        let mut path = file.to_string();
        if let Some(base) = base {
            match self.file_sources.get(base) {
                Some(dir) => path = format!("{}/{}", dir, path),
                None => self.warn(node, format!("Unknown FileSource '{}'", base)),
            }
        }
        self.relative_to_document(&path)
    }

    // --- Map ---

    fn parse_map_attributes(&mut self, node: Node, map: &mut Map) -> Result<(), ParseError> {
        self.check_attributes(node, MAP_ATTRIBUTES)?;

        if let Some(required) = node.attribute("minimum_version") {
            match (version_number(required), version_number(DOCUMENT_VERSION)) {
                (Some(r), Some(supported)) if r > supported => {
                    return Err(ParseError::UnsupportedVersion {
                        required: required.to_string(),
                        supported: DOCUMENT_VERSION.to_string(),
                    });
                }
                (None, _) => self.warn(
                    node,
                    format!("Ignoring malformed minimum_version '{}'", required),
                ),
                _ => {}
            }
        }

        if let Some(v) = parse_attr(node, "paths_from_xml", |s| parse_bool("paths_from_xml", s))? {
            self.paths_from_xml = v;
        }
        if let Some(srs) = node.attribute("srs") {
            map.srs = srs.to_string();
        }

        // `bgcolor` is the older spelling.
        let background_attr = if node.has_attribute("background-color") {
            "background-color"
        } else {
            "bgcolor"
        };
        if let Some(color) = parse_attr(node, background_attr, parse_color)? {
            map.background = Some(color);
        }
        if let Some(image) = node.attribute("background-image") {
            map.background_image = Some(self.relative_to_document(image));
        }
        if let Some(size) = parse_attr(node, "buffer_size", |s| parse_unsigned("buffer_size", s))? {
            map.buffer_size = size;
        }
        Ok(())
    }

    fn parse_map_children(&mut self, node: Node, map: &mut Map) -> Result<(), ParseError> {
        for child in elements(node) {
            match child.tag_name().name() {
                "Style" => self.parse_style(child, map)?,
                "Layer" => {
                    let layer = self.parse_layer(child, map)?;
                    map.add_layer(layer);
                }
                "FontSet" => self.parse_fontset(child, map)?,
                "FileSource" => self.parse_file_source(child)?,
                "Datasource" => self.parse_datasource_template(child)?,
                "Include" => self.parse_map_children(child, map)?,
                _ => return Err(unknown_element(child)),
            }
        }
        Ok(())
    }

    fn parse_file_source(&mut self, node: Node) -> Result<(), ParseError> {
        self.check_attributes(node, &["name"])?;
        let name = required_attr(node, "name")?;
        self.file_sources
            .insert(name.to_string(), element_text(node));
        Ok(())
    }

    fn parse_datasource_template(&mut self, node: Node) -> Result<(), ParseError> {
        self.check_attributes(node, &["name"])?;
        let name = required_attr(node, "name")?;
        let params = self.parse_parameters(node)?;
        self.datasource_templates.insert(name.to_string(), params);
        Ok(())
    }

    fn parse_parameters(&mut self, node: Node) -> Result<Parameters, ParseError> {
        let mut params = Parameters::new();
        for child in elements(node) {
            if child.tag_name().name() != "Parameter" {
                return Err(unknown_element(child));
            }
            self.check_attributes(child, &["name"])?;
            let name = required_attr(child, "name")?;
            // Whitespace can be part of a parameter value.
            params.insert(name.to_string(), raw_text(child));
        }
        Ok(params)
    }

    // --- Fontsets ---

    fn parse_fontset(&mut self, node: Node, map: &mut Map) -> Result<(), ParseError> {
        self.check_attributes(node, &["name"])?;
        let name = required_attr(node, "name")?;
        let mut fontset = FontSet::new();
        for child in elements(node) {
            if child.tag_name().name() != "Font" {
                return Err(unknown_element(child));
            }
            self.check_attributes(child, &["face_name"])?;
            fontset.add_face_name(required_attr(child, "face_name")?);
        }
        if fontset.face_names.is_empty() {
            return Err(ParseError::Structure {
                message: format!("FontSet '{}' contains no fonts", name),
                location: location(node),
            });
        }
        if !map.insert_fontset(name, fontset) {
            self.duplicate(node, "fontset", name)?;
        }
        Ok(())
    }

    // --- Styles ---

    fn parse_style(&mut self, node: Node, map: &mut Map) -> Result<(), ParseError> {
        self.check_attributes(node, &["name"])?;
        let name = required_attr(node, "name")?;
        let mut style = Style::new();
        for child in elements(node) {
            match child.tag_name().name() {
                "Rule" => style.add_rule(self.parse_rule(child)?),
                _ => return Err(unknown_element(child)),
            }
        }
        if !map.append_style(name, style) {
            self.duplicate(node, "style", name)?;
        }
        Ok(())
    }

    fn parse_rule(&mut self, node: Node) -> Result<Rule, ParseError> {
        self.check_attributes(node, &["name", "title"])?;
        let mut rule = Rule::default();
        if let Some(name) = node.attribute("name") {
            rule.name = name.to_string();
        }
        if let Some(title) = node.attribute("title") {
            rule.title = title.to_string();
        }

        for child in elements(node) {
            let tag = child.tag_name().name();
            match tag {
                "Filter" => {
                    let text = element_text(child);
                    let filter = Expression::parse(&text)
                        .map_err(|e| invalid_value(child, tag, &text, e.to_string()))?;
                    rule.filter = Some(filter);
                }
                "ElseFilter" => rule.else_filter = true,
                "MinScaleDenominator" | "MaxScaleDenominator" => {
                    let text = element_text(child);
                    let scale = parse_number(tag, &text)
                        .map_err(|e| invalid_value(child, tag, &text, e.to_string()))?;
                    if tag == "MinScaleDenominator" {
                        rule.min_scale = scale;
                    } else {
                        rule.max_scale = scale;
                    }
                }
                _ => match self.parse_symbolizer(child)? {
                    Some(symbolizer) => rule.append(symbolizer),
                    None => return Err(unknown_element(child)),
                },
            }
        }
        Ok(rule)
    }

    // --- Layers ---

    fn parse_layer(&mut self, node: Node, map: &Map) -> Result<Layer, ParseError> {
        self.check_attributes(node, LAYER_ATTRIBUTES)?;
        let name = node.attribute("name").unwrap_or("Unnamed");
        // Layers without their own srs share the map's.
        let srs = node.attribute("srs").unwrap_or(map.srs.as_str());
        let mut layer = Layer::new(name, srs);

        if let Some(title) = node.attribute("title") {
            layer.title = title.to_string();
        }
        if let Some(abstract_) = node.attribute("abstract") {
            layer.abstract_ = abstract_.to_string();
        }
        if let Some(v) = parse_attr(node, "status", |s| parse_bool("status", s))? {
            layer.active = v;
        }
        if let Some(v) = parse_attr(node, "queryable", |s| parse_bool("queryable", s))? {
            layer.queryable = v;
        }
        if let Some(v) =
            parse_attr(node, "clear_label_cache", |s| parse_bool("clear_label_cache", s))?
        {
            layer.clear_label_cache = v;
        }
        if let Some(v) = parse_attr(node, "minzoom", |s| parse_number("minzoom", s))? {
            layer.min_zoom = v;
        }
        if let Some(v) = parse_attr(node, "maxzoom", |s| parse_number("maxzoom", s))? {
            layer.max_zoom = v;
        }

        for child in elements(node) {
            match child.tag_name().name() {
                "StyleName" => {
                    let style = element_text(child);
                    if style.is_empty() {
                        return Err(ParseError::Structure {
                            message: format!("Empty StyleName in layer '{}'", layer.name),
                            location: location(child),
                        });
                    }
                    layer.add_style(&style);
                }
                "Datasource" => layer.datasource = Some(self.parse_layer_datasource(child)?),
                _ => return Err(unknown_element(child)),
            }
        }
        Ok(layer)
    }

    fn parse_layer_datasource(&mut self, node: Node) -> Result<Parameters, ParseError> {
        self.check_attributes(node, &["base"])?;
        let mut params = match node.attribute("base") {
            Some(base) => self
                .datasource_templates
                .get(base)
                .cloned()
                .ok_or_else(|| ParseError::Structure {
                    message: format!("Unknown datasource template '{}'", base),
                    location: location(node),
                })?,
            None => Parameters::new(),
        };
        params.extend(self.parse_parameters(node)?);

        // A `base` parameter is the directory `file` is relative to.
        let path_key = if params.contains_key("base") { "base" } else { "file" };
        if let Some(path) = params.get(path_key) {
            let resolved = self.relative_to_document(path);
            params.insert(path_key.to_string(), resolved);
        }
        Ok(params)
    }
}
