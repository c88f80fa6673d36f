//! Forward/inverse map projections on the WGS84 ellipsoid.
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual" (USGS PP 1395):
//! polar stereographic §21, transverse Mercator §8. Inputs and outputs of the
//! geographic side are degrees; projected coordinates are meters.

use crate::error::{GeometryError, Result};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

pub const WGS84_A: f64 = 6_378_137.0;
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

const INVERSE_MAX_ITERATIONS: usize = 15;
const INVERSE_TOLERANCE: f64 = 1e-12;
const POLE_EPSILON: f64 = 1e-9;

pub trait Projection {
    /// Geographic degrees to projected coordinates.
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// Projected coordinates to geographic degrees.
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)>;

    fn name(&self) -> &'static str;
}

fn finite_or_domain(name: &'static str, x: f64, y: f64, out: (f64, f64)) -> Result<(f64, f64)> {
    if out.0.is_finite() && out.1.is_finite() {
        Ok(out)
    } else {
        Err(GeometryError::OutOfDomain {
            crs: name.to_string(),
            x,
            y,
        })
    }
}

/// Identity: the geographic CRS itself.
#[derive(Debug, Clone, Copy)]
pub struct Geographic;

impl Projection for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        finite_or_domain(self.name(), lon, lat, (lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        finite_or_domain(self.name(), x, y, (x, y))
    }

    fn name(&self) -> &'static str {
        "geographic"
    }
}

/// Spherical ("pseudo") Mercator used by web tile servers.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let x = WGS84_A * lon.to_radians();
        let y = WGS84_A * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        finite_or_domain(self.name(), lon, lat, (x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let lon = (x / WGS84_A).to_degrees();
        let lat = (2.0 * (y / WGS84_A).exp().atan() - FRAC_PI_2).to_degrees();
        finite_or_domain(self.name(), x, y, (lon, lat))
    }

    fn name(&self) -> &'static str {
        "web mercator"
    }
}

/// Ellipsoidal polar stereographic with a latitude of true scale (variant B).
#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    /// +1 for the north polar aspect, -1 for the south.
    sign: f64,
    lon0: f64,
    /// `a * m_c / t_c`, evaluated once in the north-aspect frame.
    scale: f64,
}

impl PolarStereographic {
    pub fn north(true_scale_lat: f64, central_meridian: f64) -> Self {
        Self::with_sign(1.0, true_scale_lat, central_meridian)
    }

    pub fn south(true_scale_lat: f64, central_meridian: f64) -> Self {
        Self::with_sign(-1.0, true_scale_lat, central_meridian)
    }

    fn with_sign(sign: f64, true_scale_lat: f64, central_meridian: f64) -> Self {
        let phi_c = (sign * true_scale_lat).to_radians();
        let scale = WGS84_A * m(phi_c) / t(phi_c);
        Self {
            sign,
            lon0: (sign * central_meridian).to_radians(),
            scale,
        }
    }
}

fn e() -> f64 {
    WGS84_E2.sqrt()
}

fn m(phi: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - WGS84_E2 * s * s).sqrt()
}

fn t(phi: f64) -> f64 {
    let e = e();
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let phi = (self.sign * lat).to_radians();
        // The opposite pole projects to infinity.
        if phi <= -FRAC_PI_2 + POLE_EPSILON {
            return Err(GeometryError::OutOfDomain {
                crs: self.name().to_string(),
                x: lon,
                y: lat,
            });
        }
        let lambda = (self.sign * lon).to_radians();
        let rho = self.scale * t(phi);
        let dl = lambda - self.lon0;
        let x = rho * dl.sin();
        let y = -rho * dl.cos();
        finite_or_domain(self.name(), lon, lat, (self.sign * x, self.sign * y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (x_n, y_n) = (self.sign * x, self.sign * y);
        let rho = x_n.hypot(y_n);
        let t = rho / self.scale;
        let e = e();

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..INVERSE_MAX_ITERATIONS {
            let es = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
            let converged = (next - phi).abs() < INVERSE_TOLERANCE;
            phi = next;
            if converged {
                break;
            }
        }

        let lambda = if rho == 0.0 {
            self.lon0
        } else {
            self.lon0 + x_n.atan2(-y_n)
        };
        let lon = normalize_lon((self.sign * lambda).to_degrees());
        let lat = (self.sign * phi).to_degrees();
        finite_or_domain(self.name(), x, y, (lon, lat))
    }

    fn name(&self) -> &'static str {
        "polar stereographic"
    }
}

/// Transverse Mercator (Snyder series), configured for UTM zones.
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl TransverseMercator {
    pub fn utm(zone: u8, north: bool) -> Self {
        Self {
            lon0: (f64::from(zone) * 6.0 - 183.0).to_radians(),
            k0: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    fn meridian_arc(phi: f64) -> f64 {
        let e2 = WGS84_E2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let e2 = WGS84_E2;
        let ep2 = e2 / (1.0 - e2);
        let phi = lat.to_radians();
        let dl = wrap_radians(lon.to_radians() - self.lon0);

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();
        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = dl * cos_phi;
        let m = Self::meridian_arc(phi);

        let x = self.k0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let y = self.k0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

        finite_or_domain(
            self.name(),
            lon,
            lat,
            (x + self.false_easting, y + self.false_northing),
        )
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let e2 = WGS84_E2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);
        let x_local = x - self.false_easting;
        let y_local = y - self.false_northing;

        let m = y_local / self.k0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let denom = 1.0 - e2 * sin1 * sin1;
        let n1 = WGS84_A / denom.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / denom.powf(1.5);
        let d = x_local / (n1 * self.k0);

        let phi = phi1
            - (n1 * tan1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lambda = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        finite_or_domain(
            self.name(),
            x,
            y,
            (normalize_lon(lambda.to_degrees()), phi.to_degrees()),
        )
    }

    fn name(&self) -> &'static str {
        "transverse mercator"
    }
}

fn wrap_radians(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

fn normalize_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
