use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    #[error("Coordinate ({x}, {y}) is outside the domain of {crs}")]
    OutOfDomain { crs: String, x: f64, y: f64 },

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
