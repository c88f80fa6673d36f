use geo_types::{line_string, point, Geometry};
use gis_analysis::{AnalysisError, BufferAnalysisEngine, ProjectionChoice};
use gis_geometry::{Crs, Feature};
use gis_layer_store::{Layer, LayerStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn school(name: &str, lon: f64, lat: f64) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("name".to_string(), json!(name));
    Feature::with_properties(Geometry::Point(point!(x: lon, y: lat)), properties)
}

/// A short east-west pipeline at 70°N and schools roughly 0.45 km, 2.2 km
/// and 15 km away from it.
fn arctic_store() -> (TempDir, Arc<LayerStore>) {
    let temp = TempDir::new().expect("tempdir");
    let store = LayerStore::open(temp.path()).expect("open");
    store
        .put_layer(Layer::new(
            "pipelines",
            vec![Feature::new(Geometry::LineString(line_string![
                (x: 20.0, y: 70.0),
                (x: 20.1, y: 70.0),
            ]))],
        ))
        .expect("pipelines");
    store
        .put_layer(Layer::new(
            "schools",
            vec![
                school("Near", 20.05, 70.004),
                school("Middle", 20.05, 70.02),
                school("Far", 20.5, 70.0),
            ],
        ))
        .expect("schools");
    store
        .put_layer(Layer::new("empty", Vec::new()))
        .expect("empty");
    (temp, Arc::new(store))
}

#[test]
fn schools_within_one_kilometer_of_pipelines() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    let result = engine
        .buffer_analysis("schools", "pipelines", 1.0, "kilometers")
        .expect("analysis");

    assert_eq!(result.count, 1);
    assert_eq!(result.matched[0].properties.get("name"), Some(&json!("Near")));
    assert_eq!(result.params.target_layer, "schools");
    assert_eq!(result.params.buffer_layer, "pipelines");
    assert_eq!(result.params.distance, 1.0);
    assert_eq!(result.params.unit, "kilometers");
    assert_eq!(result.projected_crs, Crs::ArcticPolarStereographic);

    let features = result.features_geojson().expect("features");
    assert_eq!(features.features.len(), 1);
    assert_eq!(result.buffer_geojson().features.len(), 1);
}

#[test]
fn buffer_region_is_returned_in_lon_lat() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    let result = engine
        .buffer_analysis("schools", "pipelines", 1.0, "kilometers")
        .expect("analysis");

    let Geometry::MultiPolygon(region) = &result.buffer_region else {
        panic!("multipolygon region expected");
    };
    assert_eq!(region.0.len(), 1);
    for coord in region.0[0].exterior().coords() {
        assert!(coord.x > 19.9 && coord.x < 20.2, "lon {}", coord.x);
        assert!(coord.y > 69.98 && coord.y < 70.02, "lat {}", coord.y);
    }
}

#[test]
fn larger_distances_match_more_schools() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    let counts: Vec<usize> = [(1.0, "kilometers"), (3.0, "kilometers"), (20.0, "kilometers")]
        .into_iter()
        .map(|(distance, unit)| {
            engine
                .buffer_analysis("schools", "pipelines", distance, unit)
                .expect("analysis")
                .count
        })
        .collect();
    assert_eq!(counts, vec![1, 2, 3]);
}

#[test]
fn no_match_keeps_buffer_region() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    let result = engine
        .buffer_analysis("schools", "pipelines", 100.0, "feet")
        .expect("analysis");

    assert_eq!(result.count, 0);
    assert!(result.matched.is_empty());
    assert!(result.features_geojson().is_none());
    assert_eq!(result.buffer_geojson().features.len(), 1);
}

#[test]
fn auto_projection_agrees_with_polar_stereographic() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::with_projection(store, ProjectionChoice::Auto);

    let result = engine
        .buffer_analysis("schools", "pipelines", 3.0, "kilometers")
        .expect("analysis");

    assert_eq!(result.projected_crs, Crs::Utm { zone: 34, north: true });
    assert_eq!(result.count, 2);
}

#[test]
fn miles_are_converted_before_buffering() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    // 0.5 mi = 804.67 m: the near school only.
    let result = engine
        .buffer_analysis("schools", "pipelines", 0.5, "miles")
        .expect("analysis");
    assert_eq!(result.count, 1);
}

#[test]
fn missing_and_empty_layers_are_reported() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    match engine.buffer_analysis("hospitals", "pipelines", 1.0, "miles") {
        Err(AnalysisError::LayerNotFound { name, available }) => {
            assert_eq!(name, "hospitals");
            assert_eq!(available, vec!["empty", "pipelines", "schools"]);
        }
        other => panic!("unexpected: {other:?}"),
    }

    assert!(matches!(
        engine.buffer_analysis("empty", "pipelines", 1.0, "miles"),
        Err(AnalysisError::EmptyLayer(name)) if name == "empty"
    ));
    assert!(matches!(
        engine.buffer_analysis("schools", "empty", 1.0, "miles"),
        Err(AnalysisError::EmptyLayer(name)) if name == "empty"
    ));
}

#[test]
fn layers_are_checked_before_unit_and_distance() {
    let (_temp, store) = arctic_store();
    let engine = BufferAnalysisEngine::new(store);

    assert!(matches!(
        engine.buffer_analysis("hospitals", "rivers", 1.0, "leagues"),
        Err(AnalysisError::LayerNotFound { name, .. }) if name == "hospitals"
    ));
    assert!(matches!(
        engine.buffer_analysis("schools", "rivers", 0.0, "miles"),
        Err(AnalysisError::LayerNotFound { name, .. }) if name == "rivers"
    ));
    assert!(matches!(
        engine.buffer_analysis("empty", "pipelines", 1.0, "leagues"),
        Err(AnalysisError::EmptyLayer(name)) if name == "empty"
    ));
    assert!(matches!(
        engine.buffer_analysis("schools", "pipelines", 1.0, "leagues"),
        Err(AnalysisError::UnsupportedUnit(unit)) if unit == "leagues"
    ));
    assert!(matches!(
        engine.buffer_analysis("schools", "pipelines", -2.0, "miles"),
        Err(AnalysisError::InvalidDistance(_))
    ));
}

#[test]
fn uninitialized_store_is_distinct_from_missing_layer() {
    let temp = TempDir::new().expect("tempdir");
    let store = Arc::new(LayerStore::open(temp.path().join("nowhere")).expect("open"));
    let engine = BufferAnalysisEngine::new(store);

    assert!(matches!(
        engine.buffer_analysis("schools", "pipelines", 1.0, "miles"),
        Err(AnalysisError::StoreUninitialized)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn count_is_monotonic_in_distance(a in 10.0f64..25_000.0, b in 10.0f64..25_000.0) {
        let (_temp, store) = arctic_store();
        let engine = BufferAnalysisEngine::new(store);
        let (small, large) = if a <= b { (a, b) } else { (b, a) };

        let small_count = engine
            .buffer_analysis("schools", "pipelines", small, "meters")
            .expect("analysis")
            .count;
        let large_count = engine
            .buffer_analysis("schools", "pipelines", large, "meters")
            .expect("analysis")
            .count;
        prop_assert!(small_count <= large_count);
    }
}
