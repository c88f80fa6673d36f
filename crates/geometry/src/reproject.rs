use crate::crs::Crs;
use crate::error::Result;
use crate::feature::Feature;
use crate::projection::Projection;
use geo::MapCoords;
use geo_types::{Coord, Geometry};

/// Moves coordinates from one CRS to another through geographic lon/lat.
pub struct Transformer {
    from: Crs,
    to: Crs,
    source: Box<dyn Projection + Send + Sync>,
    target: Box<dyn Projection + Send + Sync>,
}

impl Transformer {
    pub fn new(from: Crs, to: Crs) -> Self {
        Self {
            from,
            to,
            source: from.projection(),
            target: to.projection(),
        }
    }

    pub fn from_crs(&self) -> Crs {
        self.from
    }

    pub fn to_crs(&self) -> Crs {
        self.to
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let (lon, lat) = self.source.inverse(coord.x, coord.y)?;
        let (x, y) = self.target.forward(lon, lat)?;
        Ok(Coord { x, y })
    }

    pub fn transform(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }

    /// Reprojects a copy of every feature; attributes are carried unchanged.
    pub fn transform_features(&self, features: &[Feature]) -> Result<Vec<Feature>> {
        features
            .iter()
            .map(|feature| {
                Ok(Feature {
                    geometry: self.transform(&feature.geometry)?,
                    properties: feature.properties.clone(),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}
