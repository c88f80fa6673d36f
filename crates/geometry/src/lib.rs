//! # GIS Geometry
//!
//! Coordinate reference systems and the geometry plumbing shared by the
//! layer store and the analysis engine.
//!
//! ## Pipeline
//!
//! ```text
//! GeoJSON / shapefile geometry
//!     │
//!     ├──> Crs detection (.prj WKT, legacy GeoJSON `crs` member)
//!     │
//!     ├──> Transformer (source CRS → lon/lat → target CRS)
//!     │      └─> Projection: polar stereographic, UTM, web mercator
//!     │
//!     └──> Feature / FeatureCollection (RFC 7946 output)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gis_geometry::{Crs, Transformer};
//! use geo_types::{point, Geometry};
//!
//! let to_polar = Transformer::new(Crs::Wgs84, Crs::ArcticPolarStereographic);
//! let projected = to_polar.transform(&Geometry::Point(point!(x: 0.0, y: 90.0))).unwrap();
//! if let Geometry::Point(p) = projected {
//!     assert!(p.x().abs() < 1e-6 && p.y().abs() < 1e-6);
//! }
//! ```

mod crs;
mod error;
mod feature;
mod projection;
mod reproject;

pub use crs::Crs;
pub use error::{GeometryError, Result};
pub use feature::{
    features_from_geojson, parse_geojson, single_feature_collection, to_feature_collection,
    Feature, GeometryKind, ParsedFeatures,
};
pub use projection::{
    Geographic, PolarStereographic, Projection, TransverseMercator, WebMercator, WGS84_A,
    WGS84_F,
};
pub use reproject::Transformer;
