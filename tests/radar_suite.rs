use std::path::{Path, PathBuf};

use radar_rs::layout::MarkerKind;
use radar_rs::render::{ElementId, RecordingSurface};
use radar_rs::{
    ChartHandle, ConfigValidationError, EntryId, LayoutError, Moved, RadarConfig, RadarError,
    RenderOptions, compute_layout, export_config, import_config, merge_configs, parse_patch,
    render_geometry, render_radar_svg,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture read failed")
}

fn load(name: &str) -> RadarConfig {
    import_config(&read_fixture(name)).expect("fixture should import")
}

#[test]
fn valid_fixtures_render() {
    for name in ["basic.json", "string_ids.json", "custom_radii.json"] {
        let config = load(name);
        let svg = render_radar_svg(&config).unwrap();
        assert!(svg.contains("<svg"), "{name}: missing <svg tag");
        assert!(svg.ends_with("</svg>"), "{name}: missing </svg tag");
    }
}

#[test]
fn export_then_import_round_trips() {
    for name in ["basic.json", "string_ids.json", "custom_radii.json"] {
        let config = load(name);
        let exported = export_config(&config).unwrap();
        assert_eq!(import_config(&exported).unwrap(), config, "{name}");
    }
}

#[test]
fn unknown_top_level_fields_survive() {
    let config = load("string_ids.json");
    assert_eq!(config.extra["revision"], 7);
    let exported = export_config(&config).unwrap();
    assert!(exported.contains("\"owner\""));
    assert!(exported.contains("radar@example.com"));
}

#[test]
fn legacy_movement_and_string_ids_import() {
    let config = load("string_ids.json");
    let duckdb = config.entry(&EntryId::Text("duckdb".to_string())).unwrap();
    assert_eq!(duckdb.moved, Moved::Up);
    let hadoop = config.entry(&"hadoop".into()).unwrap();
    assert_eq!(hadoop.moved, Moved::Down);
    let spark = config.entry(&"spark".into()).unwrap();
    assert_eq!(spark.moved, Moved::Flat);

    let exported = export_config(&config).unwrap();
    assert!(exported.contains("\"moved\": \"up\""));
}

#[test]
fn out_of_range_ring_is_rejected() {
    let err = import_config(&read_fixture("invalid_ring_index.json")).unwrap_err();
    assert_eq!(
        err,
        RadarError::Validation(ConfigValidationError::RingIndexOutOfRange {
            id: EntryId::Number(2),
            index: 2,
            count: 2,
        })
    );
}

#[test]
fn syntax_error_keeps_source_text() {
    let text = read_fixture("broken_syntax.json");
    match import_config(&text) {
        Err(RadarError::Parse(err)) => {
            assert_eq!(err.source_text(), text);
            assert!(err.line >= 4);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn layout_is_stable_across_calls() {
    let config = load("basic.json");
    let first = compute_layout(&config).unwrap();
    let second = compute_layout(&config.clone()).unwrap();
    assert_eq!(first, second);

    let svg_a = render_radar_svg(&config).unwrap();
    let svg_b = render_radar_svg(&config).unwrap();
    assert_eq!(svg_a, svg_b);
}

#[test]
fn quadrant_display_order_drives_sectors() {
    let config = load("string_ids.json");
    let geometry = compute_layout(&config).unwrap();
    // Storage has displayOrder 3: bottom-right.
    for blip in geometry.blips.iter().filter(|b| b.quadrant_index == 0) {
        assert_eq!(blip.sector, 3);
        assert!(blip.x > geometry.center.0);
        assert!(blip.y > geometry.center.1);
    }
    let markers: Vec<MarkerKind> = geometry.blips.iter().map(|b| b.marker).collect();
    assert!(markers.contains(&MarkerKind::Star));
    assert!(markers.contains(&MarkerKind::TriangleUp));
}

#[test]
fn custom_radii_and_zoom() {
    let config = load("custom_radii.json");
    let geometry = compute_layout(&config).unwrap();
    let outer: Vec<f32> = geometry.bands.iter().map(|b| b.outer_radius).collect();
    assert_eq!(outer, vec![150.0, 220.0, 300.0]);
    assert_eq!(geometry.blips.len(), 1);
    assert_eq!(geometry.blips[0].label, "gamma");
    assert!(geometry.view_box.x < geometry.center.0);
    assert!(geometry.view_box.y + geometry.view_box.height > geometry.center.1);
}

#[test]
fn merging_a_patch_file() {
    let base = load("basic.json");
    let patch = parse_patch(&read_fixture("patch_entries.json")).unwrap();
    let merged = merge_configs(&base, &patch).unwrap();

    assert_eq!(merged.title, "Engineering Radar (Q4)");
    assert_eq!(merged.entries.len(), 11);
    let moved = merged.entry(&EntryId::Number(3)).unwrap();
    assert_eq!(moved.ring_index, 1);
    // Replaced entries keep their position.
    assert_eq!(merged.entries[2].id, EntryId::Number(3));
    assert_eq!(merged.entries[10].id, EntryId::Number(11));

    let options = &merged.display_options;
    assert_eq!(options.date.as_deref(), Some("2026.12"));
    assert_eq!(options.theme.grid_color, "#999999");
    assert_eq!(options.theme.font_family, base.display_options.theme.font_family);
    assert!(options.fast_text_metrics);
    assert_eq!(options.footer, base.display_options.footer);
}

#[test]
fn merge_identities_hold_on_fixtures() {
    let base = load("basic.json");
    let empty = parse_patch("{}").unwrap();
    assert_eq!(merge_configs(&base, &empty).unwrap(), base);
    let full = parse_patch(&export_config(&base).unwrap()).unwrap();
    assert_eq!(merge_configs(&base, &full).unwrap(), base);
}

#[test]
fn chart_import_and_reset() {
    let base = load("basic.json");
    let mut chart = ChartHandle::init(base.clone(), RecordingSurface::new()).unwrap();
    chart
        .import_and_merge(&read_fixture("patch_entries.json"))
        .unwrap();
    assert_eq!(chart.surface().markers().count(), 11);
    assert!(
        chart
            .surface()
            .hover(ElementId::Legend(11))
            .contains(&ElementId::Blip(11))
    );

    chart.reset().unwrap();
    assert_eq!(chart.get_config(), base);
    assert_eq!(chart.surface().markers().count(), 10);
    assert!(chart.surface().hover(ElementId::Legend(11)).is_empty());
}

#[test]
fn chart_rejects_bad_import_without_side_effects() {
    let base = load("basic.json");
    let mut chart = ChartHandle::init(base.clone(), RecordingSurface::new()).unwrap();
    let err = chart
        .import_and_merge(r##"{"rings": [{"name": "Only", "displayOrder": 0, "color": "#fff"}]}"##)
        .unwrap_err();
    assert!(matches!(
        err,
        RadarError::Validation(ConfigValidationError::RingIndexOutOfRange { .. })
    ));
    assert_eq!(chart.get_config(), base);
    assert_eq!(chart.surface().clear_count(), 1);
}

#[test]
fn no_rings_cannot_be_laid_out() {
    let mut config = load("basic.json");
    config.rings.clear();
    config.entries.clear();
    assert!(config.validate().is_ok());
    assert_eq!(compute_layout(&config), Err(LayoutError::NoRings));
}

#[test]
fn inactive_entries_use_inactive_color() {
    let config = load("basic.json");
    let geometry = compute_layout(&config).unwrap();
    let mut surface = RecordingSurface::new();
    render_geometry(
        &geometry,
        &mut surface,
        &RenderOptions::from(&config.display_options),
    );
    let elm = surface
        .markers()
        .find(|marker| marker.tooltip == "Elm")
        .unwrap();
    assert_eq!(elm.fill, config.display_options.theme.inactive_color);
    let rust = surface
        .markers()
        .find(|marker| marker.tooltip.starts_with("Rust"))
        .unwrap();
    assert_eq!(rust.tooltip, "Rust\nDefault for new services");
}

#[test]
fn theme_colors_are_validated_on_import() {
    let mut doc: serde_json::Value = serde_json::from_str(&read_fixture("basic.json")).unwrap();
    doc["displayOptions"]["theme"] = serde_json::json!({
        "highlightColor": "red}</style><script>alert('x')</script><style>"
    });
    let err = import_config(&doc.to_string()).unwrap_err();
    assert!(matches!(
        err,
        RadarError::Validation(ConfigValidationError::InvalidDisplayOption {
            field: "theme.highlightColor",
            ..
        })
    ));

    let mut chart = ChartHandle::init(load("basic.json"), RecordingSurface::new()).unwrap();
    let patch = r##"{"displayOptions": {"theme": {"gridColor": "#111; } </style>"}}}"##;
    assert!(chart.import_and_merge(patch).is_err());
    assert_eq!(chart.get_config(), load("basic.json"));
}

#[test]
fn extra_fields_cannot_shadow_radar_fields() {
    let mut config = load("basic.json");
    config
        .extra
        .insert("title".to_string(), serde_json::Value::from("shadow"));
    assert_eq!(
        config.validate(),
        Err(ConfigValidationError::ReservedExtraField {
            key: "title".to_string()
        })
    );
    assert!(render_radar_svg(&config).is_err());
}
