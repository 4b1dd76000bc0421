//! Exercises `FilesystemSource` + `load_font` against real files on disk: a
//! minified metrics JSON and a PNG-encoded wide atlas, both written by this
//! test rather than checked in, since the only inputs `crisp_font` itself
//! needs to round-trip are metrics and pixels, not a real font binary.

use crisp_font::{
    character_set, encode_png, minify, AtlasImage, CharacterMetrics, FilesystemSource, FontAssetSource,
    FontBaselines, FontIdentity, FontMetricsBuilder, FontMetricsStore, AtlasDataStore, Style, Weight, load_font,
};

fn build_complete_metrics() -> crisp_font::FontMetrics {
    let mut b = FontMetricsBuilder::new();
    b.set_baselines(FontBaselines {
        font_bounding_box_ascent: 12.0,
        font_bounding_box_descent: 4.0,
        hanging_baseline: 12.0,
        alphabetic_baseline: 0.0,
        ideographic_baseline: -2.0,
    });
    for &c in character_set() {
        b.set_character_metrics(
            c,
            CharacterMetrics {
                width: 10.0,
                actual_bounding_box_left: 0.0,
                actual_bounding_box_right: 10.0,
                actual_bounding_box_ascent: 12.0,
                actual_bounding_box_descent: 4.0,
            },
        );
    }
    b.build()
}

fn solid_wide_atlas(columns: u32, rows: u32, cell: u32) -> AtlasImage {
    let w = columns * cell;
    let h = rows * cell;
    AtlasImage::new(w, h, vec![255u8; w as usize * h as usize * 4])
}

#[test]
fn filesystem_source_round_trips_metrics_and_atlas_through_load_font() {
    let dir = std::env::temp_dir().join(format!(
        "crisp_font_loader_integration_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let id = FontIdentity::new(1.0, "IntegrationFace", Style::Normal, Weight::Normal, 16.0);
    let metrics = build_complete_metrics();
    let minified = minify(&metrics).unwrap();
    let doc = serde_json::json!({ "id": id.id_string(), "metrics": minified });
    std::fs::write(dir.join(format!("metrics-{}.json", id.id_string())), doc.to_string()).unwrap();

    let columns = (character_set().len() as f64).sqrt().ceil() as u32;
    let rows = (character_set().len() as u32 + columns - 1) / columns;
    let wide_atlas = solid_wide_atlas(columns, rows, 10);
    let png_bytes = encode_png(&wide_atlas).unwrap();
    std::fs::write(dir.join(format!("atlas-{}.png", id.id_string())), png_bytes).unwrap();

    let source = FilesystemSource::new(dir.clone());
    let metrics_store = FontMetricsStore::new();
    let atlas_store = AtlasDataStore::new();

    load_font(&id, &source, &metrics_store, &atlas_store).unwrap();

    assert!(metrics_store.contains(&id));
    assert!(atlas_store.contains(&id));

    let loaded_atlas = atlas_store.get(&id).unwrap();
    assert!(!loaded_atlas.positioning.is_empty());
    for &c in character_set() {
        assert!(loaded_atlas.positioning.get(c).is_some(), "missing positioning for {c:?}");
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn filesystem_source_surfaces_missing_metrics_as_an_error() {
    let dir = std::env::temp_dir().join(format!(
        "crisp_font_loader_integration_missing_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let id = FontIdentity::new(1.0, "Nowhere", Style::Normal, Weight::Normal, 16.0);
    let source = FilesystemSource::new(dir.clone());
    let metrics_store = FontMetricsStore::new();
    let atlas_store = AtlasDataStore::new();

    let err = load_font(&id, &source, &metrics_store, &atlas_store).unwrap_err();
    assert!(matches!(err, crisp_font::LoadError::FetchMetrics { .. }));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn manifest_round_trips_through_read_manifest() {
    let dir = std::env::temp_dir().join(format!(
        "crisp_font_loader_integration_manifest_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let manifest_path = dir.join("manifest.json");
    std::fs::write(
        &manifest_path,
        r#"{"fonts": ["density-1-0-Arial-style-normal-weight-normal-size-14-0"]}"#,
    )
    .unwrap();

    let parsed = crisp_font::read_manifest(&manifest_path).unwrap();
    assert_eq!(parsed, vec!["density-1-0-Arial-style-normal-weight-normal-size-14-0".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}
