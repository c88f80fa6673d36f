use crate::engine::BufferAnalysisEngine;
use crate::error::{AnalysisError, Result, NO_DATASETS_MESSAGE};
use crate::extract::PatternExtractor;
use crate::packager::{package_error, package_result};
use async_trait::async_trait;
use gis_catalog::{validate, Catalog, CatalogBuilder, CatalogError, CatalogMatcher};
use gis_protocol::{ChatResponse, QueryParams, ResultSummary};
use std::sync::Arc;

/// What a collaborator made of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Buffer(QueryParams),
    /// The question is not a proximity query; `reply` goes back verbatim.
    NoSpatialIntent { reply: String },
}

/// Turns free text plus catalog vocabulary into a candidate query.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    async fn extract(&self, question: &str, catalog: &Catalog) -> Result<Intent>;
}

/// Turns a result summary into prose for the user.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, question: &str, summary: &ResultSummary) -> Result<String>;
}

/// Fixed-sentence summary; also the fallback when another summarizer fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl TemplateSummarizer {
    pub fn render(summary: &ResultSummary) -> String {
        let params = &summary.params;
        format!(
            "Found {} {} within {} {} of {}.",
            summary.count, params.target_layer, params.distance, params.unit, params.buffer_layer
        )
    }
}

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, _question: &str, summary: &ResultSummary) -> Result<String> {
        Ok(Self::render(summary))
    }
}

/// Question in, packaged response out.
///
/// Every failure ends up as a message-only response; nothing here returns
/// an error to the caller.
pub struct QueryPipeline {
    catalog_builder: CatalogBuilder,
    engine: Arc<BufferAnalysisEngine>,
    extractor: Arc<dyn IntentExtractor>,
    summarizer: Arc<dyn Summarizer>,
}

impl QueryPipeline {
    pub fn new(engine: BufferAnalysisEngine, catalog_builder: CatalogBuilder) -> Self {
        Self {
            catalog_builder,
            engine: Arc::new(engine),
            extractor: Arc::new(PatternExtractor::new()),
            summarizer: Arc::new(TemplateSummarizer),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn IntentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn engine(&self) -> &BufferAnalysisEngine {
        &self.engine
    }

    /// Fresh catalog of the store's current layers.
    pub fn catalog(&self) -> Catalog {
        self.catalog_builder.build(self.engine.store())
    }

    pub async fn answer(&self, question: &str) -> ChatResponse {
        let catalog = self.catalog();
        if catalog.is_empty() {
            return ChatResponse::message_only(NO_DATASETS_MESSAGE);
        }

        match self.extractor.extract(question, &catalog).await {
            Ok(Intent::Buffer(candidate)) => self.resolve(question, candidate, &catalog).await,
            Ok(Intent::NoSpatialIntent { reply }) => ChatResponse::message_only(reply),
            Err(err) => package_error(&err),
        }
    }

    /// Same as [`answer`](Self::answer) for an already structured query.
    pub async fn run_candidate(&self, question: &str, candidate: QueryParams) -> ChatResponse {
        let catalog = self.catalog();
        if catalog.is_empty() {
            return ChatResponse::message_only(NO_DATASETS_MESSAGE);
        }
        self.resolve(question, candidate, &catalog).await
    }

    async fn resolve(&self, question: &str, candidate: QueryParams, catalog: &Catalog) -> ChatResponse {
        match self.try_resolve(question, candidate, catalog).await {
            Ok(response) => response,
            Err(AnalysisError::UnknownLayer(err)) => {
                let mut response = package_error(&AnalysisError::UnknownLayer(err.clone()));
                if let Some(hint) = did_you_mean(&err, catalog) {
                    response.message.push(' ');
                    response.message.push_str(&hint);
                }
                response
            }
            Err(err) => package_error(&err),
        }
    }

    async fn try_resolve(
        &self,
        question: &str,
        candidate: QueryParams,
        catalog: &Catalog,
    ) -> Result<ChatResponse> {
        let params = validate(candidate, catalog)?;

        let engine = Arc::clone(&self.engine);
        let result = tokio::task::spawn_blocking(move || engine.run(&params)).await??;

        let summary = result.summary();
        let message = match self.summarizer.summarize(question, &summary).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => TemplateSummarizer::render(&summary),
            Err(err) => {
                log::warn!("Summarizer failed, using template: {err}");
                TemplateSummarizer::render(&summary)
            }
        };
        Ok(package_result(&result, message))
    }
}

/// `Did you mean a_arctic_education_osm (for schools)?`
fn did_you_mean(err: &CatalogError, catalog: &Catalog) -> Option<String> {
    let CatalogError::UnknownLayer { names, .. } = err;
    let mut matcher = CatalogMatcher::new();
    let hints: Vec<String> = names
        .iter()
        .filter_map(|name| {
            let term = name.replace('_', " ");
            matcher
                .suggest(&term, catalog, 1)
                .into_iter()
                .next()
                .map(|suggestion| format!("{suggestion} (for {name})"))
        })
        .collect();
    (!hints.is_empty()).then(|| format!("Did you mean {}?", hints.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn template_summary_reads_naturally() {
        let summary = ResultSummary {
            count: 3,
            params: QueryParams::new("schools", "pipelines", 1.5, "miles"),
        };
        assert_eq!(
            TemplateSummarizer.summarize("q", &summary).await.unwrap(),
            "Found 3 schools within 1.5 miles of pipelines."
        );
    }
}
