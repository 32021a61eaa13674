use mapstyle::{
    BuildingSymbolizer, Color, Expression, FontSet, Layer, LinePatternSymbolizer, LineSymbolizer,
    Map, Parameters, PointSymbolizer, PolygonPatternSymbolizer, PolygonSymbolizer,
    RasterColorizer, RasterSymbolizer, Rule, ShieldSymbolizer, Stroke, Style, TextSymbolizer,
};
use mapstyle_style::{LineCap, LineJoin, PatternAlignment, RasterMode, TextConvert};

/// A document using the older `bgcolor` spelling and `CssParameter`
/// children instead of attributes.
pub const CSS_PARAMETER_MAP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Map bgcolor="steelblue" srs="+proj=latlong +datum=WGS84">
    <Style name="My Style">
        <Rule>
            <PolygonSymbolizer>
                <CssParameter name="fill">#f2eff9</CssParameter>
            </PolygonSymbolizer>
            <LineSymbolizer>
                <CssParameter name="stroke">rgb(50%,50%,50%)</CssParameter>
                <CssParameter name="stroke-width">0.1</CssParameter>
            </LineSymbolizer>
        </Rule>
    </Style>
    <Layer name="world" srs="+proj=latlong +datum=WGS84">
        <StyleName>My Style</StyleName>
        <Datasource>
            <Parameter name="type">shape</Parameter>
            <Parameter name="file">data/world_merc</Parameter>
        </Datasource>
    </Layer>
</Map>
"#;

/// A document exercising most of the schema.
pub const FULL_MAP: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<Map srs="+init=epsg:3857" background-color="#b5d0d0" buffer_size="128" minimum_version="2.0.0">
    <FileSource name="symbols">icons</FileSource>
    <Datasource name="pg">
        <Parameter name="type">postgis</Parameter>
        <Parameter name="dbname">gis</Parameter>
    </Datasource>
    <FontSet name="book">
        <Font face_name="DejaVu Sans Book"/>
        <Font face_name="Unifont Medium"/>
    </FontSet>
    <Style name="roads">
        <Rule name="major" title="Major roads">
            <Filter>[highway] = 'primary'</Filter>
            <MaxScaleDenominator>500000</MaxScaleDenominator>
            <LineSymbolizer stroke="#ff0000" stroke-width="3" stroke-linecap="round" stroke-dasharray="4, 2"/>
        </Rule>
        <Rule>
            <ElseFilter/>
            <MinScaleDenominator>1000</MinScaleDenominator>
            <LineSymbolizer stroke="#999999"/>
        </Rule>
    </Style>
    <Style name="labels">
        <Rule>
            <TextSymbolizer name="[name]" fontset_name="book" size="11" fill="#333333" dy="4" halo_radius="1"/>
            <PointSymbolizer base="symbols" file="town.png" allow_overlap="true"/>
        </Rule>
    </Style>
    <Layer name="roads" status="on" queryable="true">
        <StyleName>roads</StyleName>
        <StyleName>labels</StyleName>
        <Datasource base="pg">
            <Parameter name="table">planet_osm_line</Parameter>
        </Datasource>
    </Layer>
</Map>
"##;

/// A map built in code touching every symbolizer variant. Colors are opaque
/// so their text form is exact.
pub fn sample_map() -> Map {
    let mut map = Map::new(256, 256);
    map.srs = "+init=epsg:3857".to_string();
    map.background = Some(Color::rgb(181, 208, 208));
    map.buffer_size = 64;

    let mut fontset = FontSet::new();
    fontset.add_face_name("DejaVu Sans Book");
    fontset.add_face_name("DejaVu Sans Oblique");
    map.insert_fontset("sans", fontset);

    map.append_style("areas", areas_style());
    map.append_style("lines", lines_style());
    map.append_style("labels", labels_style());
    map.append_style("elevation", elevation_style());

    let mut roads = Layer::new("roads", "+init=epsg:3857");
    roads.title = "Roads & paths".to_string();
    roads.queryable = true;
    roads.max_zoom = 1_000_000.0;
    roads.add_style("lines");
    roads.add_style("labels");
    let mut params = Parameters::new();
    params.insert("type".to_string(), "shape".to_string());
    params.insert("file".to_string(), "roads.shp".to_string());
    roads.set_datasource(params);
    map.add_layer(roads);

    let mut dem = Layer::new("dem", "+proj=longlat +datum=WGS84");
    dem.active = false;
    dem.min_zoom = 5000.0;
    dem.add_style("elevation");
    map.add_layer(dem);

    let mut land = Layer::new("land", "+init=epsg:3857");
    land.add_style("areas");
    map.add_layer(land);

    map
}

fn areas_style() -> Style {
    let mut rule = Rule::new("land", "", 0.0, f64::INFINITY);
    rule.set_filter(Expression::parse("[type] = 'forest'").unwrap());
    let mut polygon = PolygonSymbolizer::with_fill(Color::rgb(200, 220, 180));
    polygon.fill_opacity = 0.5;
    polygon.gamma = 0.7;
    rule.append(polygon);
    let mut building = BuildingSymbolizer::default();
    building.fill = Color::rgb(150, 100, 100);
    building.height = 12.5;
    rule.append(building);
    let mut pattern = PolygonPatternSymbolizer::new("hatch.png");
    pattern.alignment = PatternAlignment::Global;
    rule.append(pattern);

    let mut style = Style::new();
    style.add_rule(rule);
    style
}

fn lines_style() -> Style {
    let mut stroke = Stroke::new_with(Color::rgb(255, 0, 0), 2.5);
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Bevel;
    stroke.opacity = 0.8;
    stroke.add_dash(4.0, 2.0);
    stroke.add_dash(1.0, 2.0);
    stroke.dash_offset = 1.5;

    let mut major = Rule::new("major", "Major roads", 0.0, 250_000.0);
    major.append(LineSymbolizer::from_stroke(stroke));
    major.append(LinePatternSymbolizer::new("rail.png"));

    let mut other = Rule::new("other", "", 1000.0, 500_000.0);
    other.else_filter = true;
    other.append(LineSymbolizer::new());

    let mut style = Style::new();
    style.add_rule(major);
    style.add_rule(other);
    style
}

fn labels_style() -> Style {
    let mut text = TextSymbolizer::new(
        Expression::parse("[name]").unwrap(),
        "DejaVu Sans Book",
        12.0,
        Color::rgb(51, 51, 51),
    );
    text.properties.dy = -3.0;
    text.properties.halo_radius = 1.5;
    text.properties.wrap_width = 40;
    text.properties.text_convert = TextConvert::ToUpper;

    let mut shield = ShieldSymbolizer::new(
        Expression::parse("[ref]").unwrap(),
        "DejaVu Sans Book",
        9.0,
        Color::BLACK,
        "shield.png",
    );
    shield.text.fontset_name = Some("sans".to_string());
    shield.text.face_name = None;
    shield.shield_dy = 2.0;
    shield.opacity = 0.9;
    shield.text.opacity = 0.75;

    let mut point = PointSymbolizer::with_file("town.png");
    point.allow_overlap = true;

    let mut rule = Rule::default();
    rule.append(text);
    rule.append(shield);
    rule.append(point);
    let mut style = Style::new();
    style.add_rule(rule);
    style
}

fn elevation_style() -> Style {
    let mut colorizer = RasterColorizer::with_default_color(Color::rgb(0, 0, 255));
    colorizer.append_band(0.0, Color::rgb(0, 128, 0));
    colorizer.append_band_with_midpoints(1000.0, Color::rgb(128, 64, 0), 3);
    colorizer.append_band(3000.0, Color::WHITE);
    colorizer.append_band_range(8000.0, 8848.0, Color::rgb(250, 250, 255), 0);

    let mut raster = RasterSymbolizer::with_colorizer(colorizer);
    raster.mode = RasterMode::Multiply;
    raster.opacity = 0.6;

    let mut rule = Rule::default();
    rule.append(raster);
    let mut style = Style::new();
    style.add_rule(rule);
    style
}
