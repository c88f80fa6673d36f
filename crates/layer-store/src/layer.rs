use gis_geometry::{Feature, GeometryKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named collection of features, held in EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        GeometryKind::of_layer(&self.features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Manifest row describing one stored layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub geometry_type: GeometryKind,
    pub feature_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl LayerInfo {
    pub fn describe(layer: &Layer, source: Option<PathBuf>) -> Self {
        Self {
            name: layer.name.clone(),
            geometry_type: layer.geometry_kind(),
            feature_count: layer.len(),
            source,
        }
    }
}
