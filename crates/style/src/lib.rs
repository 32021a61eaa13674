pub mod colorizer;
pub mod expression;
pub mod parsers;
pub mod raster;
pub mod rule;
pub mod stroke;
pub mod symbolizer;
pub mod text;

pub use colorizer::{ColorBand, RasterColorizer};
pub use expression::Expression;
pub use parsers::{StyleParseError, parse_color};
pub use raster::{RasterMode, RasterScaling, RasterSymbolizer};
pub use rule::{Rule, Style};
pub use stroke::{LineCap, LineJoin, Stroke};
pub use symbolizer::{
    AttributeError, BuildingSymbolizer, LinePatternSymbolizer, LineSymbolizer, PatternAlignment,
    PointSymbolizer, PolygonPatternSymbolizer, PolygonSymbolizer, Symbolizer,
    SymbolizerAttributes,
};
pub use text::{
    FontSourceError, HorizontalAlignment, JustifyAlignment, LabelPlacement, ShieldSymbolizer,
    TextConvert, TextProperties, TextSymbolizer, VerticalAlignment,
};
