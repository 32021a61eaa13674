mod common;

use common::TestResult;
use common::fixtures::sample_map;
use mapstyle::{Map, MapError, Symbolizer, load_map_file, save_map};
use std::fs;

#[test]
fn save_then_load_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("map.xml");
    let map = sample_map();
    save_map(&map, &path, false)?;

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("<?xml"));

    // Relative paths resolve against the document's directory on load.
    let mut loaded = Map::default();
    let warnings = load_map_file(&mut loaded, &path, true)?;
    assert!(warnings.is_empty());
    let point_file = loaded
        .find_style("labels")
        .and_then(|s| {
            s.rules[0].symbolizers.iter().find_map(|sym| match sym {
                Symbolizer::Point(p) => Some(p.file.clone()),
                _ => None,
            })
        })
        .expect("point symbolizer");
    assert_eq!(
        point_file,
        dir.path().join("town.png").to_string_lossy().into_owned()
    );
    assert_eq!(loaded.layers().len(), map.layers().len());
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut map = Map::default();
    let result = load_map_file(&mut map, &dir.path().join("absent.xml"), false);
    assert!(matches!(result, Err(MapError::Io(_))));
}

#[test]
fn loading_adds_to_an_existing_map() -> TestResult {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("a.xml");
    let second = dir.path().join("b.xml");
    fs::write(&first, r#"<Map><Style name="one"><Rule/></Style></Map>"#)?;
    fs::write(&second, r#"<Map><Style name="two"><Rule/></Style><Layer name="l"/></Map>"#)?;

    let mut map = Map::default();
    load_map_file(&mut map, &first, true)?;
    load_map_file(&mut map, &second, true)?;
    let names: Vec<&str> = map.styles().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["one", "two"]);
    assert_eq!(map.layers().len(), 1);
    Ok(())
}
