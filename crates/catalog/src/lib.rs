//! # GIS Catalog
//!
//! Vocabulary for the layers in a store, and validation of candidate
//! queries against it.
//!
//! ## Pipeline
//!
//! ```text
//! Layer names (from the store)
//!     │
//!     ├──> Tokenizer (strip markers, split on non-letters)
//!     │
//!     ├──> Synonym table (token -> related words)
//!     │      └─> Catalog entries: tokens, aliases, type, description
//!     │
//!     ├──> Catalog matcher (exact / alias / fuzzy ranking for hints)
//!     │
//!     └──> Validator (both layer names must be catalog keys)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gis_catalog::{validate, CatalogBuilder, SynonymTable, TokenizerConfig};
//! use gis_geometry::GeometryKind;
//! use gis_protocol::QueryParams;
//!
//! let synonyms: SynonymTable = [("education", vec!["school", "schools"])].into_iter().collect();
//! let builder = CatalogBuilder::new(&TokenizerConfig::default(), synonyms);
//! let catalog = [
//!     builder.entry("a_arctic_education_osm", GeometryKind::Point),
//!     builder.entry("pipelines", GeometryKind::LineString),
//! ]
//! .into_iter()
//! .collect();
//!
//! let entry = builder.entry("a_arctic_education_osm", GeometryKind::Point);
//! assert!(entry.aliases.contains("schools"));
//!
//! let query = QueryParams::new("a_arctic_education_osm", "pipelines", 1.0, "miles");
//! assert!(validate(query, &catalog).is_ok());
//! ```

mod catalog;
mod error;
mod matcher;
mod synonyms;
mod tokenizer;
mod validator;

pub use catalog::{describe, Catalog, CatalogBuilder, CatalogEntry};
pub use error::{CatalogError, Result};
pub use matcher::{CatalogMatcher, LayerMatch};
pub use synonyms::SynonymTable;
pub use tokenizer::{Tokenizer, TokenizerConfig};
pub use validator::validate;
