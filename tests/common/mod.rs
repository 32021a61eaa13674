pub mod fixtures;

use mapstyle::{LoadOptions, LoadWarning, Map, MapError, load_map_into, save_map_to_string};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Loads `xml` into a fresh map in lenient mode.
pub fn load_lenient(xml: &str) -> Result<(Map, Vec<LoadWarning>), MapError> {
    load_with(xml, &LoadOptions::default())
}

/// Loads `xml` into a fresh map in strict mode.
pub fn load_strict(xml: &str) -> Result<Map, MapError> {
    load_with(xml, &LoadOptions::strict()).map(|(map, _)| map)
}

pub fn load_with(xml: &str, options: &LoadOptions) -> Result<(Map, Vec<LoadWarning>), MapError> {
    let mut map = Map::default();
    let warnings = load_map_into(&mut map, xml, options)?;
    Ok((map, warnings))
}

/// Saves `map` and loads the result back in strict mode.
pub fn round_trip(map: &Map, explicit_defaults: bool) -> Result<Map, MapError> {
    let xml = save_map_to_string(map, explicit_defaults)?;
    load_strict(&xml)
}
