use crate::error::{AnalysisError, Result};
use gis_protocol::DistanceUnit;

/// Meters in one `unit`.
pub fn meters_per(unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Meters => 1.0,
        DistanceUnit::Kilometers => 1000.0,
        DistanceUnit::Miles => 1609.34,
        DistanceUnit::Feet => 0.3048,
    }
}

/// `distance` in `unit`, converted to meters.
///
/// Unit names are matched exactly (`"miles"`, `"kilometers"`, `"meters"`,
/// `"feet"`).
pub fn convert_to_meters(distance: f64, unit: &str) -> Result<f64> {
    let unit = DistanceUnit::parse(unit)
        .ok_or_else(|| AnalysisError::UnsupportedUnit(unit.to_string()))?;
    Ok(distance * meters_per(unit))
}

/// Like [`convert_to_meters`], but the distance must also be finite and
/// positive.
pub fn buffer_distance_meters(distance: f64, unit: &str) -> Result<f64> {
    let meters = convert_to_meters(distance, unit)?;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(AnalysisError::InvalidDistance(distance));
    }
    Ok(meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn known_factors() {
        assert_eq!(convert_to_meters(1.0, "meters").unwrap(), 1.0);
        assert_eq!(convert_to_meters(1.0, "kilometers").unwrap(), 1000.0);
        assert_eq!(convert_to_meters(1.0, "miles").unwrap(), 1609.34);
        assert_eq!(convert_to_meters(1.0, "feet").unwrap(), 0.3048);
        assert_eq!(convert_to_meters(0.5, "miles").unwrap(), 804.67);
    }

    #[test]
    fn unknown_units_are_rejected() {
        for unit in ["yards", "Miles", "km", ""] {
            assert!(matches!(
                convert_to_meters(1.0, unit),
                Err(AnalysisError::UnsupportedUnit(u)) if u == unit
            ));
        }
    }

    #[test]
    fn non_positive_distances_are_invalid() {
        for distance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                buffer_distance_meters(distance, "meters"),
                Err(AnalysisError::InvalidDistance(_))
            ));
        }
        assert!(matches!(
            buffer_distance_meters(-1.0, "leagues"),
            Err(AnalysisError::UnsupportedUnit(_))
        ));
    }

    proptest! {
        #[test]
        fn conversion_is_linear(d in -1.0e6f64..1.0e6, k in -100.0f64..100.0) {
            for unit in DistanceUnit::ALL {
                let unit = unit.as_str();
                let scaled = convert_to_meters(k * d, unit).unwrap();
                let expected = k * convert_to_meters(d, unit).unwrap();
                prop_assert!((scaled - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }
}
