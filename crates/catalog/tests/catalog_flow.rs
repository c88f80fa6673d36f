use geo_types::{point, Geometry};
use gis_catalog::{validate, CatalogBuilder, CatalogError, SynonymTable, TokenizerConfig};
use gis_geometry::{Feature, GeometryKind};
use gis_layer_store::{Layer, LayerStore};
use gis_protocol::QueryParams;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn synonyms() -> SynonymTable {
    [
        ("education", vec!["education", "school", "schools"]),
        ("pipelines", vec!["pipeline", "oil", "gas"]),
    ]
    .into_iter()
    .collect()
}

fn point_layer(name: &str) -> Layer {
    Layer::new(
        name,
        vec![Feature::new(Geometry::Point(point!(x: 20.0, y: 70.0)))],
    )
}

#[test]
fn catalog_follows_store_contents() {
    let temp = TempDir::new().expect("tempdir");
    let store = LayerStore::open(temp.path()).expect("open");
    let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms());

    assert!(builder.build(&store).is_empty());

    store
        .put_layer(point_layer("a_arctic_education_osm"))
        .expect("put");
    let catalog = builder.build(&store);
    assert_eq!(catalog.names(), vec!["a_arctic_education_osm"]);

    store.put_layer(point_layer("pipelines")).expect("put");
    let catalog = builder.build(&store);
    assert_eq!(catalog.names(), vec!["a_arctic_education_osm", "pipelines"]);

    let entry = catalog.get("a_arctic_education_osm").expect("entry");
    assert_eq!(entry.tokens, vec!["arctic", "education"]);
    assert_eq!(entry.geometry_type, GeometryKind::Point);
    assert!(entry.aliases.contains("schools"));
}

#[test]
fn validation_uses_the_current_catalog() {
    let temp = TempDir::new().expect("tempdir");
    let store = LayerStore::open(temp.path()).expect("open");
    store.put_layer(point_layer("schools")).expect("put");
    let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms());

    let candidate = QueryParams::new("schools", "pipelines", 1.0, "miles");
    let err = validate(candidate.clone(), &builder.build(&store)).expect_err("unknown buffer");
    assert_eq!(
        err,
        CatalogError::UnknownLayer {
            names: vec!["pipelines".to_string()],
            available: vec!["schools".to_string()],
        }
    );

    store.put_layer(point_layer("pipelines")).expect("put");
    assert_eq!(
        validate(candidate.clone(), &builder.build(&store)).expect("valid"),
        candidate
    );
}

proptest! {
    #[test]
    fn aliases_are_a_superset_of_tokens(name in "[a-z_0-9 -]{0,40}") {
        let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms());
        let entry = builder.entry(&name, GeometryKind::Unknown);
        for token in &entry.tokens {
            prop_assert!(entry.aliases.contains(token));
        }
    }

    #[test]
    fn tokenization_is_deterministic(name in "\\PC{0,40}") {
        let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms());
        prop_assert_eq!(
            builder.entry(&name, GeometryKind::Point),
            builder.entry(&name, GeometryKind::Point)
        );
    }
}
