//! # mapstyle-core
//!
//! The map document: a [`Map`] with its styles, fontsets and layers, the
//! XML loader and saver, validation, and the render planning seam.
//!
//! Value types live in `mapstyle-types`, the style model in
//! `mapstyle-style` and the datasource abstraction in `mapstyle-traits`;
//! they are re-exported here so most callers only need this crate.

pub use mapstyle_style as style;
pub use mapstyle_traits as traits;
pub use mapstyle_types as types;

pub mod error;
pub mod map;
pub mod parser;
pub mod render;
pub mod writer;

pub use error::{Location, MapError, ParseError, ValidationError};
pub use map::{DEFAULT_SRS, FontSet, Layer, Map, is_geographic};
pub use parser::{
    DOCUMENT_VERSION, LoadOptions, LoadWarning, load_map, load_map_file, load_map_into,
};
pub use render::{
    BackgroundRenderer, LayerPlan, PixelBuffer, RenderPlan, Renderer, RendererCapabilities,
    StylePlan,
};
pub use writer::{save_map, save_map_to_string};

pub use types::{Box2d, Color, Coord};
