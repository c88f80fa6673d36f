use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use gis_protocol::QueryParams;

/// Checks that both layers of a candidate query exist in `catalog`.
///
/// Every unresolved name is reported, target first, each once. Names are
/// compared verbatim; aliases are never substituted here.
pub fn validate(candidate: QueryParams, catalog: &Catalog) -> Result<QueryParams> {
    let mut missing: Vec<String> = Vec::new();
    for name in [&candidate.target_layer, &candidate.buffer_layer] {
        if !catalog.contains(name) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }

    if missing.is_empty() {
        Ok(candidate)
    } else {
        log::debug!("Unresolved layers: {missing:?}");
        Err(CatalogError::UnknownLayer {
            names: missing,
            available: catalog.names(),
        })
    }
}
