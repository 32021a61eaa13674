//! # mapstyle
//!
//! A cartographic style model: maps made of layers and named styles, styles
//! made of scale-ranged rules, rules made of symbolizers. Maps load from and
//! save to an XML document format.
//!
//! ```no_run
//! use mapstyle::{LoadOptions, load_map, save_map_to_string};
//!
//! let map = load_map("<Map/>", &LoadOptions::default()).unwrap();
//! let xml = save_map_to_string(&map, false).unwrap();
//! assert!(xml.contains("<Map"));
//! ```

pub use mapstyle_core::*;
pub use mapstyle_style::{
    AttributeError, BuildingSymbolizer, ColorBand, Expression, FontSourceError, LineCap, LineJoin,
    LinePatternSymbolizer, LineSymbolizer, PointSymbolizer, PolygonPatternSymbolizer,
    PolygonSymbolizer, RasterColorizer, RasterMode, RasterScaling, RasterSymbolizer, Rule,
    ShieldSymbolizer, Stroke, Style, StyleParseError, Symbolizer, SymbolizerAttributes,
    TextProperties, TextSymbolizer, VerticalAlignment, parse_color,
};
pub use mapstyle_traits::{
    Datasource, DatasourceError, DatasourceRegistry, Feature, MemoryDatasource, Parameters, Value,
};
