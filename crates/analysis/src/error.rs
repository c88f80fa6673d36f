use gis_catalog::CatalogError;
use gis_layer_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

pub const NO_DATASETS_MESSAGE: &str = "There are no datasets available yet. Load some layers first.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while running the analysis. Please try again later.";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Layer '{name}' not found. Available layers: {}", available.join(", "))]
    LayerNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    UnknownLayer(#[from] CatalogError),

    #[error("No data found in '{0}' layer")]
    EmptyLayer(String),

    #[error("Unsupported unit: {0}. Use: miles, kilometers, meters, or feet")]
    UnsupportedUnit(String),

    #[error("Invalid distance: {0}. The distance must be a positive number")]
    InvalidDistance(f64),

    #[error("Layer store is not initialized")]
    StoreUninitialized,

    #[error("Unsupported analysis projection: {0}")]
    UnsupportedProjection(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] gis_geometry::GeometryError),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Intent extraction failed: {0}")]
    Extraction(String),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl AnalysisError {
    /// Errors caused by what the user asked for, safe to show verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AnalysisError::LayerNotFound { .. }
                | AnalysisError::UnknownLayer(_)
                | AnalysisError::EmptyLayer(_)
                | AnalysisError::UnsupportedUnit(_)
                | AnalysisError::InvalidDistance(_)
        )
    }

    /// Text that may leave the core for this error.
    pub fn user_message(&self) -> String {
        match self {
            err if err.is_user_facing() => err.to_string(),
            AnalysisError::StoreUninitialized => NO_DATASETS_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LayerNotFound { name, available } => {
                AnalysisError::LayerNotFound { name, available }
            }
            StoreError::StoreUninitialized => AnalysisError::StoreUninitialized,
            other => AnalysisError::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        AnalysisError::Task(err.to_string())
    }
}
