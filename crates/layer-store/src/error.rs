use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Geometry error: {0}")]
    GeometryError(#[from] gis_geometry::GeometryError),

    #[error("Shapefile error: {0}")]
    ShapefileError(String),

    #[error("Layer '{name}' not found. Available layers: {}", available.join(", "))]
    LayerNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Layer store is not initialized. Load layers first.")]
    StoreUninitialized,

    #[error("Failed to load {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("Invalid store path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub fn load_failure(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
