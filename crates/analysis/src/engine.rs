use crate::error::{AnalysisError, Result};
use crate::projection::ProjectionChoice;
use crate::units::buffer_distance_meters;
use geo::{unary_union, Buffer, Intersects};
use geo_types::{Geometry, MultiPolygon};
use geojson::FeatureCollection;
use gis_geometry::{single_feature_collection, to_feature_collection, Crs, Feature, Transformer};
use gis_layer_store::LayerStore;
use gis_protocol::{QueryParams, ResultSummary};
use std::sync::Arc;

/// Outcome of one buffer-and-intersect query, in EPSG:4326.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub count: usize,
    /// Target features inside the buffer region, attributes included.
    pub matched: Vec<Feature>,
    /// All buffers dissolved into one (multi)polygon.
    pub buffer_region: Geometry<f64>,
    pub params: QueryParams,
    /// The planar CRS the buffers were computed in.
    pub projected_crs: Crs,
}

impl AnalysisResult {
    /// `None` when nothing matched.
    pub fn features_geojson(&self) -> Option<FeatureCollection> {
        (self.count > 0).then(|| to_feature_collection(&self.matched))
    }

    pub fn buffer_geojson(&self) -> FeatureCollection {
        single_feature_collection(self.buffer_region.clone())
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            count: self.count,
            params: self.params.clone(),
        }
    }
}

/// Buffers one layer and selects the features of another that touch it
pub struct BufferAnalysisEngine {
    store: Arc<LayerStore>,
    projection: ProjectionChoice,
}

impl BufferAnalysisEngine {
    pub fn new(store: Arc<LayerStore>) -> Self {
        Self::with_projection(store, ProjectionChoice::default())
    }

    pub fn with_projection(store: Arc<LayerStore>, projection: ProjectionChoice) -> Self {
        Self { store, projection }
    }

    pub fn store(&self) -> &Arc<LayerStore> {
        &self.store
    }

    pub fn projection(&self) -> ProjectionChoice {
        self.projection
    }

    pub fn run(&self, params: &QueryParams) -> Result<AnalysisResult> {
        self.buffer_analysis(
            &params.target_layer,
            &params.buffer_layer,
            params.distance,
            &params.unit,
        )
    }

    /// Features of `target_layer` within `distance` `unit` of any feature of
    /// `buffer_layer`.
    ///
    /// Intersection is boundary-inclusive. Both layers are read from one
    /// store snapshot.
    pub fn buffer_analysis(
        &self,
        target_layer: &str,
        buffer_layer: &str,
        distance: f64,
        unit: &str,
    ) -> Result<AnalysisResult> {
        let snapshot = self.store.snapshot()?;
        let target = snapshot.layer(target_layer)?;
        let buffer = snapshot.layer(buffer_layer)?;
        if target.is_empty() {
            return Err(AnalysisError::EmptyLayer(target.name.clone()));
        }
        if buffer.is_empty() {
            return Err(AnalysisError::EmptyLayer(buffer.name.clone()));
        }
        let meters = buffer_distance_meters(distance, unit)?;

        let crs = self.projection.resolve(&target.features, &buffer.features);
        log::debug!(
            "Buffering '{buffer_layer}' by {meters} m in {crs}; target '{target_layer}'"
        );
        let forward = Transformer::new(Crs::Wgs84, crs);
        let back = Transformer::new(crs, Crs::Wgs84);

        let buffers = buffer
            .features
            .iter()
            .map(|feature| -> Result<MultiPolygon<f64>> {
                Ok(forward.transform(&feature.geometry)?.buffer(meters))
            })
            .collect::<Result<Vec<_>>>()?;
        let region = unary_union(&buffers);

        let projected_targets = forward.transform_features(&target.features)?;
        let matched: Vec<Feature> = projected_targets
            .iter()
            .zip(&target.features)
            .filter(|(projected, _)| projected.geometry.intersects(&region))
            .map(|(_, original)| original.clone())
            .collect();

        let buffer_region = back.transform(&Geometry::MultiPolygon(region))?;
        let count = matched.len();
        log::info!(
            "{count} of {} '{target_layer}' features within {distance} {unit} of '{buffer_layer}'",
            target.len()
        );

        Ok(AnalysisResult {
            count,
            matched,
            buffer_region,
            params: QueryParams::new(target_layer, buffer_layer, distance, unit),
            projected_crs: crs,
        })
    }
}
