//! # GIS Layer Store
//!
//! Named geometry layers, ingested from a data root and persisted as
//! GeoJSON tables.
//!
//! ## Pipeline
//!
//! ```text
//! Data root
//!     │
//!     ├──> Source Scanner (.shp / .geojson / .json, one folder per layer)
//!     │      └─> Source files + normalized layer names
//!     │
//!     ├──> Loader (CRS detection, reprojection to EPSG:4326)
//!     │      └─> Layers
//!     │
//!     └──> Layer Store (tables + manifest, atomic writes)
//!            └─> Immutable snapshots for readers
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gis_layer_store::LayerStore;
//!
//! fn main() -> gis_layer_store::Result<()> {
//!     let store = LayerStore::open("store")?;
//!     let loaded = store.load_all("data")?;
//!     println!("Loaded {loaded} sources: {:?}", store.list_layer_names()?);
//!     Ok(())
//! }
//! ```

mod error;
mod layer;
mod loader;
mod paths;
mod scanner;
mod store;

pub use error::{Result, StoreError};
pub use layer::{Layer, LayerInfo};
pub use loader::load_source;
pub use paths::{layer_name_for, normalize_layer_name, MANIFEST_FILE_NAME};
pub use scanner::{SourceFile, SourceFormat, SourceScanner};
pub use store::{LayerStore, StoreSnapshot};
