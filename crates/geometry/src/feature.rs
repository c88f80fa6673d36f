use crate::crs::Crs;
use crate::error::Result;
use geo_types::Geometry;
use geojson::{FeatureCollection, GeoJson, JsonObject};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One geometry plus its attribute columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: JsonObject,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: JsonObject::new(),
        }
    }

    pub fn with_properties(geometry: Geometry<f64>, properties: JsonObject) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub fn to_geojson(&self) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Unknown,
}

impl GeometryKind {
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::Line(_) | Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                GeometryKind::Polygon
            }
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Kind of the first feature; `Unknown` when there is none.
    pub fn of_layer(features: &[Feature]) -> Self {
        features
            .first()
            .map(|feature| Self::of(&feature.geometry))
            .unwrap_or(GeometryKind::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
            GeometryKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features read out of a GeoJSON document.
#[derive(Debug, Clone)]
pub struct ParsedFeatures {
    pub features: Vec<Feature>,
    /// CRS declared through the legacy `crs` member, if any.
    pub declared_crs: Option<Crs>,
    /// Features dropped because they carried no geometry.
    pub dropped: usize,
}

pub fn parse_geojson(text: &str) -> Result<ParsedFeatures> {
    let document: GeoJson = text.parse()?;
    features_from_geojson(document)
}

pub fn features_from_geojson(document: GeoJson) -> Result<ParsedFeatures> {
    let (raw_features, foreign_members) = match document {
        GeoJson::FeatureCollection(collection) => {
            (collection.features, collection.foreign_members)
        }
        GeoJson::Feature(feature) => {
            let foreign = feature.foreign_members.clone();
            (vec![feature], foreign)
        }
        GeoJson::Geometry(geometry) => {
            let foreign = geometry.foreign_members.clone();
            let feature = geojson::Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            };
            (vec![feature], foreign)
        }
    };

    let declared_crs = foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .map(Crs::from_geojson_member)
        .transpose()?;

    let mut features = Vec::with_capacity(raw_features.len());
    let mut dropped = 0usize;
    for raw in raw_features {
        let Some(geometry) = raw.geometry else {
            dropped += 1;
            continue;
        };
        let geometry = Geometry::<f64>::try_from(geometry.value)?;
        features.push(Feature {
            geometry,
            properties: raw.properties.unwrap_or_default(),
        });
    }

    Ok(ParsedFeatures {
        features,
        declared_crs,
        dropped,
    })
}

pub fn to_feature_collection(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(Feature::to_geojson).collect(),
        foreign_members: None,
    }
}

/// A collection holding one attribute-less feature.
pub fn single_feature_collection(geometry: Geometry<f64>) -> FeatureCollection {
    to_feature_collection(&[Feature::new(geometry)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHOOLS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "North"}, "geometry": {"type": "Point", "coordinates": [20.05, 70.004]}},
            {"type": "Feature", "properties": {"name": "Ghost"}, "geometry": null},
            {"type": "Feature", "properties": null, "geometry": {"type": "Point", "coordinates": [20.5, 70.0]}}
        ]
    }"#;

    #[test]
    fn parses_features_and_drops_null_geometries() {
        let parsed = parse_geojson(SCHOOLS).unwrap();
        assert_eq!(parsed.features.len(), 2);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.declared_crs, None);
        assert_eq!(
            parsed.features[0].properties.get("name"),
            Some(&serde_json::json!("North"))
        );
        assert!(parsed.features[1].properties.is_empty());
        assert_eq!(GeometryKind::of_layer(&parsed.features), GeometryKind::Point);
    }

    #[test]
    fn reads_declared_crs_member() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": []
        }"#;
        let parsed = parse_geojson(text).unwrap();
        assert_eq!(parsed.declared_crs, Some(Crs::WebMercator));
        assert_eq!(GeometryKind::of_layer(&parsed.features), GeometryKind::Unknown);
    }

    #[test]
    fn bare_geometry_becomes_one_feature() {
        let parsed =
            parse_geojson(r#"{"type": "LineString", "coordinates": [[0, 0], [1, 1]]}"#).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(
            GeometryKind::of(&parsed.features[0].geometry),
            GeometryKind::LineString
        );
    }

    #[test]
    fn collection_output_keeps_properties() {
        let parsed = parse_geojson(SCHOOLS).unwrap();
        let collection = to_feature_collection(&parsed.features);
        assert_eq!(collection.features.len(), 2);
        let first = &collection.features[0];
        assert_eq!(
            first.properties.as_ref().and_then(|p| p.get("name")),
            Some(&serde_json::json!("North"))
        );
    }
}
