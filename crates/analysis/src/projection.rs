use crate::error::{AnalysisError, Result};
use geo::BoundingRect;
use geo_types::Rect;
use gis_geometry::{Crs, Feature};
use std::fmt;
use std::str::FromStr;

/// The planar CRS distances are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionChoice {
    Fixed(Crs),
    /// Picked per query from the extent of both layers.
    Auto,
}

impl Default for ProjectionChoice {
    fn default() -> Self {
        ProjectionChoice::Fixed(Crs::ArcticPolarStereographic)
    }
}

impl ProjectionChoice {
    pub fn fixed(crs: Crs) -> Result<Self> {
        if !crs.is_distance_preserving() {
            return Err(AnalysisError::UnsupportedProjection(format!(
                "{crs} does not measure distances in meters"
            )));
        }
        Ok(ProjectionChoice::Fixed(crs))
    }

    pub fn resolve(&self, target: &[Feature], buffer: &[Feature]) -> Crs {
        match self {
            ProjectionChoice::Fixed(crs) => *crs,
            ProjectionChoice::Auto => {
                let extent = target
                    .iter()
                    .chain(buffer)
                    .filter_map(|feature| feature.geometry.bounding_rect())
                    .reduce(merge);
                match extent {
                    Some(extent) => {
                        let center = extent.center();
                        auto_crs(center.x, center.y)
                    }
                    None => Crs::ArcticPolarStereographic,
                }
            }
        }
    }
}

/// Polar stereographic near the poles, the local UTM zone elsewhere.
pub fn auto_crs(lon: f64, lat: f64) -> Crs {
    if lat >= 84.0 {
        Crs::ArcticPolarStereographic
    } else if lat <= -80.0 {
        Crs::AntarcticPolarStereographic
    } else {
        Crs::utm_for(lon, lat)
    }
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
        (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
    )
}

impl FromStr for ProjectionChoice {
    type Err = AnalysisError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("auto") {
            return Ok(ProjectionChoice::Auto);
        }
        let crs = Crs::from_str(raw)
            .map_err(|err| AnalysisError::UnsupportedProjection(err.to_string()))?;
        Self::fixed(crs)
    }
}

impl fmt::Display for ProjectionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionChoice::Fixed(crs) => write!(f, "{crs}"),
            ProjectionChoice::Auto => f.write_str("auto"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, Geometry};
    use pretty_assertions::assert_eq;

    fn at(lon: f64, lat: f64) -> Feature {
        Feature::new(Geometry::Point(point!(x: lon, y: lat)))
    }

    #[test]
    fn parses_configured_values() {
        assert_eq!(
            "EPSG:3995".parse::<ProjectionChoice>().unwrap(),
            ProjectionChoice::Fixed(Crs::ArcticPolarStereographic)
        );
        assert_eq!(
            "32633".parse::<ProjectionChoice>().unwrap(),
            ProjectionChoice::Fixed(Crs::Utm { zone: 33, north: true })
        );
        assert_eq!("AUTO".parse::<ProjectionChoice>().unwrap(), ProjectionChoice::Auto);
    }

    #[test]
    fn rejects_non_metric_projections() {
        for raw in ["EPSG:4326", "EPSG:3857", "EPSG:2154"] {
            assert!(matches!(
                raw.parse::<ProjectionChoice>(),
                Err(AnalysisError::UnsupportedProjection(_))
            ));
        }
    }

    #[test]
    fn auto_follows_the_combined_extent() {
        let auto = ProjectionChoice::Auto;
        assert_eq!(
            auto.resolve(&[at(20.0, 70.0)], &[at(20.1, 70.0)]),
            Crs::Utm { zone: 34, north: true }
        );
        assert_eq!(
            auto.resolve(&[at(0.0, 86.0)], &[at(90.0, 88.0)]),
            Crs::ArcticPolarStereographic
        );
        assert_eq!(
            auto.resolve(&[at(160.0, -85.0)], &[at(170.0, -82.0)]),
            Crs::AntarcticPolarStereographic
        );
        assert_eq!(
            auto.resolve(&[at(-3.0, -40.0)], &[at(-1.0, -40.0)]),
            Crs::Utm { zone: 30, north: false }
        );
    }

    #[test]
    fn default_is_arctic_polar_stereographic() {
        assert_eq!(
            ProjectionChoice::default().resolve(&[at(-70.0, 10.0)], &[]),
            Crs::ArcticPolarStereographic
        );
    }
}
