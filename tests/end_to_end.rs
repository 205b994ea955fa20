use std::io::Write;
use std::path::PathBuf;

use income_atlas::app::App;
use income_atlas::config::{Columns, SceneConfig};
use income_atlas::data::{Location, Sources};
use income_atlas::map::color::{yl_or_br, UNKNOWN};
use income_atlas::svg;
use income_atlas::LoadError;

const TABLE: &str = "iso_n3\tname\tincome_grp\n\
    004\tAfghanistan\t5. Low income\n\
    250\tFrance\t1. High income: OECD\n\
    \"076\"\tBrazil\t3. Upper middle income\n";

/// Quantized squares; Brazil's numeric id misses the table key and the
/// last one (arc 0 reversed) has no row at all.
const TOPOLOGY: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [0.01, 0.01], "translate": [-180, -90]},
    "objects": {"countries": {"type": "GeometryCollection", "geometries": [
        {"type": "Polygon", "arcs": [[0]], "id": "004"},
        {"type": "Polygon", "arcs": [[1]], "id": "250"},
        {"type": "Polygon", "arcs": [[2]], "id": 76},
        {"type": "Polygon", "arcs": [[-1]], "id": "999"}
    ]}},
    "arcs": [
        [[24000, 12000], [1000, 0], [0, 1000], [-1000, 0], [0, -1000]],
        [[18000, 13500], [800, 0], [0, 800], [-800, 0], [0, -800]],
        [[12500, 7000], [2000, 0], [0, 2000], [-2000, 0], [0, -2000]]
    ]
}"#;

/// Every feature has a matching table row.
const MATCHING_TOPOLOGY: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [0.01, 0.01], "translate": [-180, -90]},
    "objects": {"countries": {"type": "GeometryCollection", "geometries": [
        {"type": "Polygon", "arcs": [[0]], "id": "004"},
        {"type": "Polygon", "arcs": [[1]], "id": "250"},
        {"type": "Polygon", "arcs": [[2]], "id": "076"}
    ]}},
    "arcs": [
        [[24000, 12000], [1000, 0], [0, 1000], [-1000, 0], [0, -1000]],
        [[18000, 13500], [800, 0], [0, 800], [-800, 0], [0, -800]],
        [[12500, 7000], [2000, 0], [0, 2000], [-2000, 0], [0, -2000]]
    ]
}"#;

fn temp_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn loaded() -> App {
    load_with(TABLE, TOPOLOGY)
}

fn load_with(table: &str, topology: &str) -> App {
    let table = temp_file(table);
    let topology = temp_file(topology);
    let sources = Sources {
        table: Location::File(table.path().to_path_buf()),
        topology: Location::File(topology.path().to_path_buf()),
    };
    let mut app = App::new(SceneConfig::default());
    app.start(&sources, &Columns::default(), "countries").unwrap();
    app
}

#[test]
fn test_every_feature_becomes_a_coloured_shape() {
    let app = loaded();
    let shapes = app.scene.shapes();
    assert_eq!(shapes.len(), 4);

    let palette = yl_or_br(2);
    for shape in &shapes[..2] {
        assert!(shape.path.starts_with('M'));
        assert!(shape.path.ends_with('Z'));
        assert!(palette.contains(&shape.fill), "{} not in palette", shape.fill);
    }
    // numeric id 76 does not match the zero-padded "076" key
    assert_eq!(shapes[2].name, None);
    assert_eq!(shapes[2].fill, UNKNOWN);
    assert_eq!(shapes[3].fill, UNKNOWN);
}

#[test]
fn test_three_matching_countries_use_three_class_palette() {
    let app = load_with(TABLE, MATCHING_TOPOLOGY);
    let shapes = app.scene.shapes();
    assert_eq!(shapes.len(), 3);

    let palette = yl_or_br(3);
    for shape in shapes {
        assert!(!shape.path.is_empty());
        assert!(shape.path.ends_with('Z'));
        assert!(palette.contains(&shape.fill), "{} not in palette", shape.fill);
    }
    assert_ne!(shapes[0].fill, shapes[1].fill);
    assert_ne!(shapes[1].fill, shapes[2].fill);
    assert_ne!(shapes[0].fill, shapes[2].fill);
    assert_eq!(shapes[2].name.as_deref(), Some("Brazil"));
    assert_eq!(app.legend.entries().len(), 3);
}

#[test]
fn test_fills_follow_reverse_sorted_domain() {
    let app = loaded();
    let palette = yl_or_br(2);
    // domain: "5. Low income", "1. High income: OECD"
    assert_eq!(app.scene.shapes()[0].fill, palette[0]);
    assert_eq!(app.scene.shapes()[1].fill, palette[1]);
}

#[test]
fn test_legend_lists_distinct_categories_in_reverse() {
    let app = loaded();
    let labels: Vec<&str> = app.legend.entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["High income: OECD", "Low income"]);
    assert_eq!(app.legend.entries()[0].position, (160.0, 500.0));
    assert_eq!(app.legend.entries()[1].position, (160.0, 545.0));
}

#[test]
fn test_svg_export() {
    let app = loaded();
    let document = svg::to_svg(
        &app.scene,
        &app.legend,
        &app.overlay.group_transform,
        svg::WIDTH,
        svg::HEIGHT,
    );
    assert_eq!(document.matches(r#"class="countries""#).count(), 4);
    assert!(document.contains("<title>France: High income: OECD</title>"));
    assert!(document.contains("<title>999: No data</title>"));
}

#[test]
fn test_load_failure_renders_nothing() {
    let table = temp_file(TABLE);
    let sources = Sources {
        table: Location::File(table.path().to_path_buf()),
        topology: Location::File(PathBuf::from("/nonexistent/50m.json")),
    };
    let mut app = App::new(SceneConfig::default());
    let err = app.start(&sources, &Columns::default(), "countries").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert_eq!(app.scene.shapes().len(), 0);
    assert_eq!(app.legend.entries().len(), 0);
}

#[test]
fn test_missing_object_is_a_load_failure() {
    let table = temp_file(TABLE);
    let topology = temp_file(TOPOLOGY);
    let sources = Sources {
        table: Location::File(table.path().to_path_buf()),
        topology: Location::File(topology.path().to_path_buf()),
    };
    let mut app = App::new(SceneConfig::default());
    let err = app.start(&sources, &Columns::default(), "land").unwrap_err();
    assert!(matches!(err, LoadError::Topology(_)));
    assert!(app.scene.shapes().is_empty());
}
