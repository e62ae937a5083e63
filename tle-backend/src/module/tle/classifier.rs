//! Altitude and regime classification from mean motion

use std::f64::consts::PI;

use tle_common::{ClassifiedOrbit, EarthModel, OrbitRegime};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Upper bound (exclusive) of low Earth orbit
pub const LEO_CEILING_KM: f64 = 2_000.0;
/// Geostationary altitude
pub const GEO_ALTITUDE_KM: f64 = 35_786.0;
/// Half-width of the GEO window around [`GEO_ALTITUDE_KM`] (inclusive)
pub const GEO_WINDOW_KM: f64 = 1_500.0;

/// Mean motion in rad/s
pub fn mean_motion_rad_s(mean_motion_rev_per_day: f64) -> f64 {
    mean_motion_rev_per_day * 2.0 * PI / SECONDS_PER_DAY
}

/// Semi-major axis (km) from Kepler's third law, `a = (mu / n^2)^(1/3)`.
pub fn semi_major_axis_km(mean_motion_rev_per_day: Option<f64>, earth: &EarthModel) -> Option<f64> {
    let rev_per_day = mean_motion_rev_per_day.filter(|n| *n > 0.0)?;
    let n = mean_motion_rad_s(rev_per_day);
    let a = (earth.mu_km3_s2 / (n * n)).cbrt();
    a.is_finite().then_some(a)
}

/// Circular-orbit altitude above the Earth's radius.
///
/// `None` for absent, zero or negative mean motion, or a non-finite result.
pub fn altitude_from_mean_motion(
    mean_motion_rev_per_day: Option<f64>,
    earth: &EarthModel,
) -> Option<f64> {
    let altitude = semi_major_axis_km(mean_motion_rev_per_day, earth)? - earth.radius_km;
    altitude.is_finite().then_some(altitude)
}

/// Bucket an altitude into a regime.
///
/// The GEO window is tested before the MEO upper bound, so altitudes within
/// 1500 km below GEO are GEO even though they are also <= 35786.
pub fn classify_regime(altitude_km: Option<f64>) -> Option<OrbitRegime> {
    let alt = altitude_km.filter(|a| a.is_finite())?;

    let regime = if alt < LEO_CEILING_KM {
        OrbitRegime::Leo
    } else if (alt - GEO_ALTITUDE_KM).abs() <= GEO_WINDOW_KM {
        OrbitRegime::Geo
    } else if alt <= GEO_ALTITUDE_KM {
        OrbitRegime::Meo
    } else {
        OrbitRegime::Heo
    };
    Some(regime)
}

/// Altitude and regime for a mean motion; missing in, missing out
pub fn classify(mean_motion_rev_per_day: Option<f64>, earth: &EarthModel) -> ClassifiedOrbit {
    let altitude_km = altitude_from_mean_motion(mean_motion_rev_per_day, earth);
    ClassifiedOrbit {
        altitude_km,
        regime: classify_regime(altitude_km),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EARTH: EarthModel = EarthModel::STANDARD;

    #[test]
    fn test_altitude_invalid_inputs() {
        assert_eq!(altitude_from_mean_motion(Some(0.0), &EARTH), None);
        assert_eq!(altitude_from_mean_motion(Some(-1.0), &EARTH), None);
        assert_eq!(altitude_from_mean_motion(None, &EARTH), None);
        assert_eq!(altitude_from_mean_motion(Some(f64::NAN), &EARTH), None);
        assert_eq!(altitude_from_mean_motion(Some(1e-300), &EARTH), None);
    }

    #[test]
    fn test_altitude_geostationary() {
        // one sidereal day per revolution
        let alt = altitude_from_mean_motion(Some(1.00273791), &EARTH).unwrap();
        assert!((alt - GEO_ALTITUDE_KM).abs() < 5.0, "alt = {}", alt);
    }

    #[test]
    fn test_altitude_iss() {
        let alt = altitude_from_mean_motion(Some(15.50377579), &EARTH).unwrap();
        assert!(alt > 380.0 && alt < 440.0, "alt = {}", alt);
        assert_eq!(classify_regime(Some(alt)), Some(OrbitRegime::Leo));
    }

    #[test]
    fn test_regime_boundaries() {
        assert_eq!(classify_regime(Some(1999.99)), Some(OrbitRegime::Leo));
        assert_eq!(classify_regime(Some(2000.0)), Some(OrbitRegime::Meo));
        assert_eq!(classify_regime(Some(34286.0)), Some(OrbitRegime::Geo));
        assert_eq!(classify_regime(Some(34285.99)), Some(OrbitRegime::Meo));
        assert_eq!(classify_regime(Some(35786.0)), Some(OrbitRegime::Geo));
        assert_eq!(classify_regime(Some(37286.0)), Some(OrbitRegime::Geo));
        assert_eq!(classify_regime(Some(37287.0)), Some(OrbitRegime::Heo));
        assert_eq!(classify_regime(Some(-50.0)), Some(OrbitRegime::Leo));
    }

    #[test]
    fn test_regime_missing() {
        assert_eq!(classify_regime(None), None);
        assert_eq!(classify_regime(Some(f64::NAN)), None);
        assert_eq!(classify_regime(Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_classify_example_object() {
        let orbit = classify(Some(4.18358561), &EARTH);
        let alt = orbit.altitude_km.unwrap();
        assert!(alt > 9_000.0 && alt < 11_000.0, "alt = {}", alt);
        assert_eq!(orbit.regime, Some(OrbitRegime::Meo));
    }

    #[test]
    fn test_classify_missing_propagates() {
        assert_eq!(classify(None, &EARTH), ClassifiedOrbit::default());
        assert_eq!(classify(Some(0.0), &EARTH), ClassifiedOrbit::default());
    }

    #[test]
    fn test_custom_earth_model() {
        let flat = EarthModel { mu_km3_s2: EARTH.mu_km3_s2, radius_km: 0.0 };
        let a = semi_major_axis_km(Some(4.18358561), &EARTH).unwrap();
        let alt = altitude_from_mean_motion(Some(4.18358561), &flat).unwrap();
        assert!((alt - a).abs() < 1e-9);
    }
}
