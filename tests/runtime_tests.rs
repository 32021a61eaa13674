mod common;

use common::{TestResult, load_lenient, load_strict};
use mapstyle::{
    BackgroundRenderer, Box2d, Color, DatasourceRegistry, MapError, PixelBuffer, RenderPlan,
    Renderer, ValidationError, Value,
};

const POIS_MAP: &str = r#"<Map srs="+proj=merc" background-color="white">
    <Style name="pois">
        <Rule name="close"><MaxScaleDenominator>50000</MaxScaleDenominator><PointSymbolizer/></Rule>
        <Rule name="any"><PointSymbolizer/></Rule>
    </Style>
    <Layer name="pois" queryable="true">
        <StyleName>pois</StyleName>
        <Datasource>
            <Parameter name="type">memory</Parameter>
            <Parameter name="inline">[
                {"id": 7, "envelope": {"minx": 10, "miny": 10, "maxx": 10, "maxy": 10},
                 "properties": {"name": "well", "depth": 12}},
                {"id": 8, "envelope": {"minx": 90, "miny": 40, "maxx": 90, "maxy": 40}}
            ]</Parameter>
        </Datasource>
    </Layer>
</Map>"#;

#[test]
fn zoom_all_query_and_plan() -> TestResult {
    let registry = DatasourceRegistry::with_builtins();
    let mut map = load_strict(POIS_MAP)?;
    map.resize(160, 60);
    map.zoom_all(&registry)?;
    assert_eq!(map.current_extent(), Box2d::new(10.0, 10.0, 90.0, 40.0));
    assert!((map.scale() - 0.5).abs() < 1e-9);

    let hits = map.query_point(0, 10.0, 10.0, &registry)?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 7);
    assert_eq!(hits[0].get("name"), Some(&Value::from("well")));

    let plan = RenderPlan::build(&map);
    assert_eq!(plan.layers.len(), 1);
    let styles = &plan.layers[0].styles;
    assert_eq!(styles.len(), 1);
    // 0.5 units per pixel is far below 1:50000.
    assert_eq!(styles[0].rules.len(), 2);
    Ok(())
}

#[test]
fn dangling_style_fails_strict_load_and_warns_leniently() -> TestResult {
    let xml = POIS_MAP.replace(
        "<StyleName>pois</StyleName>",
        "<StyleName>pois</StyleName><StyleName>ghost</StyleName>",
    );
    let dangling = ValidationError::MissingStyle {
        layer: "pois".to_string(),
        style: "ghost".to_string(),
    };
    match load_strict(&xml) {
        Err(MapError::Validation(e)) => assert_eq!(e, dangling),
        other => panic!("expected a validation error, got {:?}", other),
    }

    let (map, warnings) = load_lenient(&xml)?;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, dangling.to_string());
    assert_eq!(warnings[0].location.line, 1);
    assert_eq!(map.validate(), vec![dangling]);
    assert!(matches!(map.ensure_valid(), Err(MapError::Validation(_))));
    Ok(())
}

#[test]
fn background_renders_into_buffer() -> TestResult {
    let map = load_strict(POIS_MAP)?;
    let mut surface = PixelBuffer::new(map.width, map.height);
    BackgroundRenderer.render(&map, &mut surface)?;
    assert_eq!(surface.pixel(0, 0), Some(Color::WHITE));
    Ok(())
}

#[test]
fn unknown_datasource_type_fails() -> TestResult {
    let xml = r#"<Map><Layer name="l"><Datasource><Parameter name="type">gdal</Parameter></Datasource></Layer></Map>"#;
    let map = load_strict(xml)?;
    let registry = DatasourceRegistry::with_builtins();
    assert!(matches!(
        map.query_point(0, 0.0, 0.0, &registry),
        Err(MapError::Datasource(_))
    ));
    Ok(())
}
