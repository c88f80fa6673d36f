use crate::error::{Result, StoreError};
use crate::layer::Layer;
use crate::scanner::{SourceFile, SourceFormat};
use geo::BoundingRect;
use gis_geometry::{parse_geojson, Crs, Feature, Transformer};
use serde_json::{Map, Number, Value};
use shapefile::dbase::FieldValue;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads one source file into a layer normalized to EPSG:4326.
pub fn load_source(source: &SourceFile) -> Result<Layer> {
    let raw = match source.format {
        SourceFormat::Shapefile => read_shapefile(&source.path)?,
        SourceFormat::GeoJson => read_geojson(&source.path)?,
    };

    if raw.dropped > 0 {
        log::debug!(
            "{}: dropped {} features without geometry",
            source.path.display(),
            raw.dropped
        );
    }

    let features = match raw.crs {
        DeclaredCrs::Known(Crs::Wgs84) | DeclaredCrs::Implicit => raw.features,
        DeclaredCrs::Known(crs) => {
            log::info!(
                "Reprojecting {} from {crs} to {}",
                source.layer_name,
                Crs::Wgs84
            );
            Transformer::new(crs, Crs::Wgs84)
                .transform_features(&raw.features)
                .map_err(|err| StoreError::load_failure(&source.path, err.to_string()))?
        }
        DeclaredCrs::Missing => {
            log::warn!(
                "{} has no CRS; assuming {}",
                source.path.display(),
                Crs::Wgs84
            );
            raw.features
        }
    };

    check_geographic_range(&source.path, &features)?;
    Ok(Layer::new(source.layer_name.clone(), features))
}

enum DeclaredCrs {
    Known(Crs),
    /// RFC 7946 GeoJSON without a `crs` member is lon/lat by definition.
    Implicit,
    Missing,
}

struct RawFeatures {
    features: Vec<Feature>,
    crs: DeclaredCrs,
    dropped: usize,
}

fn read_geojson(path: &Path) -> Result<RawFeatures> {
    let text = fs::read_to_string(path)?;
    let parsed =
        parse_geojson(&text).map_err(|err| StoreError::load_failure(path, err.to_string()))?;
    Ok(RawFeatures {
        features: parsed.features,
        crs: parsed
            .declared_crs
            .map(DeclaredCrs::Known)
            .unwrap_or(DeclaredCrs::Implicit),
        dropped: parsed.dropped,
    })
}

fn read_shapefile(path: &Path) -> Result<RawFeatures> {
    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|err| StoreError::ShapefileError(format!("{}: {err}", path.display())))?;

    let mut features = Vec::new();
    let mut dropped = 0usize;
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item
            .map_err(|err| StoreError::ShapefileError(format!("{}: {err}", path.display())))?;
        if matches!(shape, shapefile::Shape::NullShape) {
            dropped += 1;
            continue;
        }
        let geometry = geo_types::Geometry::<f64>::try_from(shape)
            .map_err(|err| StoreError::load_failure(path, err.to_string()))?;
        let fields: HashMap<String, FieldValue> = record.into();
        features.push(Feature::with_properties(geometry, record_properties(fields)));
    }

    let crs = match prj_path(path) {
        Some(prj) => {
            let wkt = fs::read_to_string(&prj)?;
            let crs =
                Crs::from_wkt(&wkt).map_err(|err| StoreError::load_failure(&prj, err.to_string()))?;
            DeclaredCrs::Known(crs)
        }
        None => DeclaredCrs::Missing,
    };

    Ok(RawFeatures {
        features,
        crs,
        dropped,
    })
}

fn prj_path(shp: &Path) -> Option<PathBuf> {
    ["prj", "PRJ", "Prj"]
        .iter()
        .map(|ext| shp.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

fn record_properties(fields: HashMap<String, FieldValue>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}

fn field_to_json(value: FieldValue) -> Value {
    fn number(value: Option<f64>) -> Value {
        value
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    match value {
        FieldValue::Character(text) => text
            .map(|text| Value::String(text.trim_end().to_string()))
            .unwrap_or(Value::Null),
        FieldValue::Memo(text) => Value::String(text),
        FieldValue::Numeric(value) => number(value),
        FieldValue::Float(value) => number(value.map(f64::from)),
        FieldValue::Double(value) => number(Some(value)),
        FieldValue::Integer(value) => Value::from(value),
        FieldValue::Logical(value) => value.map(Value::Bool).unwrap_or(Value::Null),
        other => Value::String(format!("{other:?}")),
    }
}

/// After normalization every coordinate must be a plausible lon/lat.
fn check_geographic_range(path: &Path, features: &[Feature]) -> Result<()> {
    for feature in features {
        let Some(rect) = feature.geometry.bounding_rect() else {
            continue;
        };
        let (min, max) = (rect.min(), rect.max());
        if min.x < -180.0 || max.x > 180.0 || min.y < -90.0 || max.y > 90.0 {
            return Err(StoreError::load_failure(
                path,
                format!(
                    "coordinates ({}, {})..({}, {}) are outside the lon/lat range; declare the CRS",
                    min.x, min.y, max.x, max.y
                ),
            ));
        }
    }
    Ok(())
}
