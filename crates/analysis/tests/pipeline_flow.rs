use async_trait::async_trait;
use geo_types::{line_string, point, Geometry};
use gis_analysis::{
    AnalysisError, BufferAnalysisEngine, Intent, IntentExtractor, QueryPipeline, Summarizer,
    NO_DATASETS_MESSAGE,
};
use gis_catalog::{Catalog, CatalogBuilder, SynonymTable, TokenizerConfig};
use gis_geometry::Feature;
use gis_layer_store::{Layer, LayerStore};
use gis_protocol::{QueryParams, ResultSummary};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn builder() -> CatalogBuilder {
    let synonyms: SynonymTable = [
        ("education", vec!["education", "school", "schools"]),
        ("pipelines", vec!["pipeline", "oil", "gas"]),
    ]
    .into_iter()
    .collect();
    CatalogBuilder::new(&TokenizerConfig::default(), synonyms)
}

fn pipeline_over(temp: &TempDir) -> QueryPipeline {
    let store = LayerStore::open(temp.path()).expect("open");
    store
        .put_layer(Layer::new(
            "oil_pipelines",
            vec![Feature::new(Geometry::LineString(line_string![
                (x: 20.0, y: 70.0),
                (x: 20.1, y: 70.0),
            ]))],
        ))
        .expect("pipelines");
    store
        .put_layer(Layer::new(
            "a_arctic_education_osm",
            vec![
                Feature::new(Geometry::Point(point!(x: 20.05, y: 70.004))),
                Feature::new(Geometry::Point(point!(x: 20.5, y: 70.0))),
            ],
        ))
        .expect("schools");
    QueryPipeline::new(BufferAnalysisEngine::new(Arc::new(store)), builder())
}

struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _question: &str, _summary: &ResultSummary) -> gis_analysis::Result<String> {
        Err(AnalysisError::Extraction("quota exhausted".into()))
    }
}

struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, question: &str, summary: &ResultSummary) -> gis_analysis::Result<String> {
        Ok(format!("{question} -> {}", summary.count))
    }
}

struct ChattyExtractor;

#[async_trait]
impl IntentExtractor for ChattyExtractor {
    async fn extract(&self, _question: &str, catalog: &Catalog) -> gis_analysis::Result<Intent> {
        Ok(Intent::NoSpatialIntent {
            reply: format!("Hello! I know {} datasets.", catalog.len()),
        })
    }
}

#[tokio::test]
async fn answers_a_natural_language_question() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp);

    let response = pipeline
        .answer("How many schools are within 1 km of pipelines?")
        .await;

    assert_eq!(response.count, Some(1));
    assert_eq!(
        response.message,
        "Found 1 a_arctic_education_osm within 1 kilometers of oil_pipelines."
    );
    assert_eq!(
        response.params,
        Some(QueryParams::new(
            "a_arctic_education_osm",
            "oil_pipelines",
            1.0,
            "kilometers"
        ))
    );
    assert!(response.features_geojson.is_some());
    assert!(response.buffer_geojson.is_some());
}

#[tokio::test]
async fn injected_summarizer_writes_the_message() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp).with_summarizer(Arc::new(EchoSummarizer));

    let candidate = QueryParams::new("a_arctic_education_osm", "oil_pipelines", 20.0, "kilometers");
    let response = pipeline.run_candidate("all schools", candidate).await;

    assert_eq!(response.message, "all schools -> 2");
}

#[tokio::test]
async fn failing_summarizer_falls_back_to_template() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp).with_summarizer(Arc::new(FailingSummarizer));

    let candidate = QueryParams::new("a_arctic_education_osm", "oil_pipelines", 0.5, "miles");
    let response = pipeline.run_candidate("schools near pipelines", candidate).await;

    assert_eq!(response.count, Some(1));
    assert_eq!(
        response.message,
        "Found 1 a_arctic_education_osm within 0.5 miles of oil_pipelines."
    );
}

#[tokio::test]
async fn unknown_layers_produce_a_message_with_hints() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp);

    let candidate = QueryParams::new("schools", "rivers", 1.0, "miles");
    let response = pipeline.run_candidate("schools near rivers", candidate).await;

    assert!(response.is_message_only());
    assert_eq!(
        response.message,
        "Dataset(s) not found: [schools, rivers]. Please enter a query that relates to any of \
         the available datasets, which are: a_arctic_education_osm, oil_pipelines. \
         Did you mean a_arctic_education_osm (for schools)?"
    );
}

#[tokio::test]
async fn engine_errors_are_packaged() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp);

    let candidate = QueryParams::new("a_arctic_education_osm", "oil_pipelines", 1.0, "parsecs");
    let response = pipeline.run_candidate("q", candidate).await;

    assert!(response.is_message_only());
    assert_eq!(
        response.message,
        "Unsupported unit: parsecs. Use: miles, kilometers, meters, or feet"
    );
}

#[tokio::test]
async fn non_spatial_questions_get_the_collaborator_reply() {
    let temp = TempDir::new().expect("tempdir");
    let pipeline = pipeline_over(&temp).with_extractor(Arc::new(ChattyExtractor));

    let response = pipeline.answer("hi there").await;

    assert!(response.is_message_only());
    assert_eq!(response.message, "Hello! I know 2 datasets.");
}

#[tokio::test]
async fn empty_store_short_circuits() {
    let temp = TempDir::new().expect("tempdir");
    let store = Arc::new(LayerStore::open(temp.path()).expect("open"));
    let pipeline = QueryPipeline::new(BufferAnalysisEngine::new(store), builder());

    let response = pipeline.answer("schools within 1 mile of pipelines").await;

    assert!(response.is_message_only());
    assert_eq!(response.message, NO_DATASETS_MESSAGE);
}
