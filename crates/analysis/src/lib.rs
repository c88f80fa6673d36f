//! # GIS Analysis
//!
//! Buffer-and-intersect analysis over stored layers, and the pipeline that
//! turns a question into a packaged response.
//!
//! ## Pipeline
//!
//! ```text
//! Question
//!     │
//!     ├──> Catalog (fresh per question)
//!     │
//!     ├──> IntentExtractor ──> candidate query | no-intent reply
//!     │
//!     ├──> Validator (both layers must exist)
//!     │
//!     ├──> BufferAnalysisEngine (blocking task)
//!     │      meters → project → buffer → dissolve → intersect → EPSG:4326
//!     │
//!     ├──> Summarizer (template fallback)
//!     │
//!     └──> Packager ──> ChatResponse
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gis_analysis::{BufferAnalysisEngine, QueryPipeline};
//! use gis_catalog::CatalogBuilder;
//! use gis_layer_store::LayerStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(LayerStore::open("store")?);
//!     let pipeline = QueryPipeline::new(BufferAnalysisEngine::new(store), CatalogBuilder::default());
//!
//!     let response = pipeline.answer("schools within 1 mile of pipelines").await;
//!     println!("{}", response.message);
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod extract;
mod packager;
mod pipeline;
mod projection;
mod units;

pub use engine::{AnalysisResult, BufferAnalysisEngine};
pub use error::{AnalysisError, Result, GENERIC_FAILURE_MESSAGE, NO_DATASETS_MESSAGE};
pub use extract::PatternExtractor;
pub use packager::{package_error, package_result};
pub use pipeline::{Intent, IntentExtractor, QueryPipeline, Summarizer, TemplateSummarizer};
pub use projection::{auto_crs, ProjectionChoice};
pub use units::{buffer_distance_meters, convert_to_meters, meters_per};
