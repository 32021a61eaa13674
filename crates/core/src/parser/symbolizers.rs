use super::loader::{
    MapParser, element_text, elements, invalid_value, location, parse_attr, parse_required_attr,
    required_attr, unknown_element,
};
use crate::error::ParseError;
use mapstyle_style::parsers::{parse_color, parse_number, parse_unsigned};
use mapstyle_style::{
    AttributeError, ColorBand, FontSourceError, RasterColorizer, Symbolizer, SymbolizerAttributes,
};
use roxmltree::Node;

impl MapParser<'_> {
    /// Parses a `*Symbolizer` element. Returns `Ok(None)` if the element is
    /// not a symbolizer.
    pub(super) fn parse_symbolizer(&mut self, node: Node) -> Result<Option<Symbolizer>, ParseError> {
        let Some(mut symbolizer) = Symbolizer::from_element_name(node.tag_name().name()) else {
            return Ok(None);
        };

        let base = node.attribute("base");
        for attr in node.attributes() {
            match attr.name() {
                "base" => {}
                "file" => {
                    let file = self.resolve_path(node, attr.value(), base);
                    self.apply_attribute(node, &mut symbolizer, "file", &file)?;
                }
                name => self.apply_attribute(node, &mut symbolizer, name, attr.value())?,
            }
        }

        let accepts_css = matches!(
            symbolizer,
            Symbolizer::Line(_) | Symbolizer::Polygon(_) | Symbolizer::Building(_)
        );
        for child in elements(node) {
            match child.tag_name().name() {
                "CssParameter" if accepts_css => {
                    self.check_attributes(child, &["name"])?;
                    let name = required_attr(child, "name")?;
                    let value = element_text(child);
                    self.apply_attribute(child, &mut symbolizer, name, &value)?;
                }
                "RasterColorizer" => match &mut symbolizer {
                    Symbolizer::Raster(raster) => {
                        raster.colorizer = Some(self.parse_colorizer(child)?);
                    }
                    _ => return Err(unknown_element(child)),
                },
                _ => return Err(unknown_element(child)),
            }
        }

        check_required(node, &symbolizer)?;
        Ok(Some(symbolizer))
    }

    fn apply_attribute(
        &mut self,
        node: Node,
        symbolizer: &mut Symbolizer,
        name: &str,
        value: &str,
    ) -> Result<(), ParseError> {
        match symbolizer.set_attribute(name, value) {
            Ok(()) => Ok(()),
            Err(AttributeError::Unknown { .. }) => self.unknown_attribute(node, name),
            Err(AttributeError::Invalid(e)) => Err(invalid_value(node, name, value, e.to_string())),
        }
    }

    fn parse_colorizer(&mut self, node: Node) -> Result<RasterColorizer, ParseError> {
        self.check_attributes(node, &["default-color"])?;
        let mut colorizer = RasterColorizer::new();
        if let Some(color) = parse_attr(node, "default-color", parse_color)? {
            colorizer.default_color = color;
        }
        for band in elements(node) {
            if band.tag_name().name() != "ColorBand" {
                return Err(unknown_element(band));
            }
            self.check_attributes(band, &["value", "color", "midpoints", "max_value"])?;
            let value = parse_required_attr(band, "value", |s| parse_number("value", s))?;
            let color = parse_required_attr(band, "color", parse_color)?;
            let midpoints =
                parse_attr(band, "midpoints", |s| parse_unsigned("midpoints", s))?.unwrap_or(0);
            let max_value = parse_attr(band, "max_value", |s| parse_number("max_value", s))?;
            colorizer.append(ColorBand {
                midpoints,
                max_value,
                ..ColorBand::new(value, color)
            });
        }
        Ok(colorizer)
    }
}

/// Attributes without a usable default.
fn check_required(node: Node, symbolizer: &Symbolizer) -> Result<(), ParseError> {
    let required: &[&str] = match symbolizer {
        Symbolizer::Text(_) => &["name"],
        Symbolizer::Shield(_) => &["name", "file"],
        Symbolizer::LinePattern(_) | Symbolizer::PolygonPattern(_) => &["file"],
        _ => &[],
    };
    for attribute in required {
        required_attr(node, attribute)?;
    }

    let Some(text) = symbolizer.text_properties() else {
        return Ok(());
    };
    match text.check_font_source() {
        Ok(()) => Ok(()),
        Err(FontSourceError::Conflicting) => Err(ParseError::Structure {
            message: format!(
                "<{}> must not have both face_name and fontset_name",
                node.tag_name().name()
            ),
            location: location(node),
        }),
        Err(FontSourceError::Missing) => Err(ParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: "face_name or fontset_name".to_string(),
            location: location(node),
        }),
    }
}
