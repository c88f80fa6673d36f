use crate::error::{GeometryError, Result};
use crate::projection::{
    Geographic, PolarStereographic, Projection, TransverseMercator, WebMercator,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate reference systems the workspace can read, write or analyse in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// EPSG:4326, longitude/latitude in degrees. The web-mapping CRS.
    Wgs84,
    /// EPSG:3857
    WebMercator,
    /// EPSG:3995, true scale at 71°N, central meridian 0°.
    ArcticPolarStereographic,
    /// EPSG:3413, true scale at 70°N, central meridian 45°W.
    NsidcPolarStereographicNorth,
    /// EPSG:3031, true scale at 71°S, central meridian 0°.
    AntarcticPolarStereographic,
    /// EPSG:326xx (north) / 327xx (south).
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3857 | 900913 | 102100 => Ok(Crs::WebMercator),
            3995 => Ok(Crs::ArcticPolarStereographic),
            3413 => Ok(Crs::NsidcPolarStereographicNorth),
            3031 => Ok(Crs::AntarcticPolarStereographic),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            other => Err(GeometryError::UnsupportedCrs(format!("EPSG:{other}"))),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::ArcticPolarStereographic => 3995,
            Crs::NsidcPolarStereographicNorth => 3413,
            Crs::AntarcticPolarStereographic => 3031,
            Crs::Utm { zone, north: true } => 32600 + u32::from(*zone),
            Crs::Utm { zone, north: false } => 32700 + u32::from(*zone),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }

    /// Whether planar distances in this CRS are close enough to ground
    /// distances to buffer by meters. Web Mercator is not.
    pub fn is_distance_preserving(&self) -> bool {
        !matches!(self, Crs::Wgs84 | Crs::WebMercator)
    }

    /// UTM zone containing the given lon/lat.
    pub fn utm_for(lon: f64, lat: f64) -> Self {
        let normalized = (lon + 180.0).rem_euclid(360.0);
        let zone = ((normalized / 6.0).floor() as u8).min(59) + 1;
        Crs::Utm {
            zone,
            north: lat >= 0.0,
        }
    }

    pub fn projection(&self) -> Box<dyn Projection + Send + Sync> {
        match self {
            Crs::Wgs84 => Box::new(Geographic),
            Crs::WebMercator => Box::new(WebMercator),
            Crs::ArcticPolarStereographic => Box::new(PolarStereographic::north(71.0, 0.0)),
            Crs::NsidcPolarStereographicNorth => Box::new(PolarStereographic::north(70.0, -45.0)),
            Crs::AntarcticPolarStereographic => Box::new(PolarStereographic::south(-71.0, 0.0)),
            Crs::Utm { zone, north } => Box::new(TransverseMercator::utm(*zone, *north)),
        }
    }

    /// Reads the CRS out of a `.prj` sidecar.
    ///
    /// An EPSG authority on the outermost object wins; otherwise the
    /// well-known ESRI names are recognized. Authorities on nested objects
    /// (the datum or base GEOGCS of a projection) are ignored.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let wkt = wkt.trim();
        let outer = AUTHORITY_RE.captures_iter(wkt).last().filter(|caps| {
            caps.get(0)
                .is_some_and(|m| wkt[m.end()..].chars().all(|c| c == ']' || c.is_whitespace()))
        });
        if let Some(code) = outer
            .as_ref()
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return Crs::from_epsg(code);
        }

        let normalized = wkt.trim().to_lowercase().replace([' ', '-'], "_");
        if normalized.starts_with("projcs[") || normalized.starts_with("projcrs[") {
            let name = PROJCS_NAME_RE
                .captures(&normalized)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if name.contains("web_mercator") || name.contains("pseudo_mercator") {
                return Ok(Crs::WebMercator);
            }
            if name.contains("antarctic_polar_stereographic") {
                return Ok(Crs::AntarcticPolarStereographic);
            }
            if name.contains("arctic_polar_stereographic") {
                return Ok(Crs::ArcticPolarStereographic);
            }
            if name.contains("nsidc_sea_ice_polar_stereographic_north") {
                return Ok(Crs::NsidcPolarStereographicNorth);
            }
            if let Some(caps) = UTM_NAME_RE.captures(name) {
                let zone: u8 = caps[1].parse().unwrap_or(0);
                if (1..=60).contains(&zone) {
                    return Ok(Crs::Utm {
                        zone,
                        north: &caps[2] == "n",
                    });
                }
            }
            return Err(GeometryError::UnsupportedCrs(format!("projected WKT '{name}'")));
        }

        if (normalized.starts_with("geogcs[") || normalized.starts_with("geogcrs["))
            && (normalized.contains("wgs_1984") || normalized.contains("wgs_84"))
        {
            return Ok(Crs::Wgs84);
        }

        Err(GeometryError::UnsupportedCrs(
            wkt.chars().take(64).collect::<String>(),
        ))
    }

    /// Reads the legacy (pre RFC 7946) `crs` member of a GeoJSON object.
    pub fn from_geojson_member(member: &serde_json::Value) -> Result<Self> {
        let name = member
            .get("properties")
            .and_then(|props| props.get("name"))
            .and_then(|name| name.as_str())
            .ok_or_else(|| {
                GeometryError::UnsupportedCrs(format!("unrecognized crs member {member}"))
            })?;
        name.parse()
    }
}

static AUTHORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]|ID\[\s*"EPSG"\s*,\s*(\d+)\s*\]"#)
        .expect("valid authority regex")
});

static PROJCS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^projc(?:s|rs)\["([^"]*)""#).expect("valid projcs regex"));

static UTM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"utm_zone_(\d{1,2})([ns])").expect("valid utm regex"));

impl FromStr for Crs {
    type Err = GeometryError;

    /// Accepts `EPSG:n`, `urn:ogc:def:crs:EPSG::n`, `CRS84` and the bare code.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();
        if lowered.ends_with("crs84") {
            return Ok(Crs::Wgs84);
        }
        let code = lowered
            .rsplit(':')
            .next()
            .and_then(|tail| tail.parse::<u32>().ok())
            .ok_or_else(|| GeometryError::UnsupportedCrs(trimmed.to_string()))?;
        Crs::from_epsg(code)
    }
}

impl TryFrom<String> for Crs {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
