use serde::{Deserialize, Serialize};

/// One validated three-line element set.
///
/// `line1` starts with `"1 "` and `line2` with `"2 "`; both are trimmed of
/// trailing whitespace. Produced by the triplet extractor and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TleRecord {
    /// Catalog group or file the record came from (CSV column `group`)
    #[serde(rename = "group")]
    pub source_group: String,
    pub name: String,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    pub fn new(
        source_group: impl Into<String>,
        name: impl Into<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Self {
        Self {
            source_group: source_group.into(),
            name: name.into(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }
}

/// Orbital parameters read from fixed TLE columns.
///
/// Each field is independently optional: a malformed column only blanks
/// that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub norad_id: Option<u32>,
    pub inclination_deg: Option<f64>,
    pub mean_motion_rev_per_day: Option<f64>,
}

/// Altitude band of an orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitRegime {
    #[serde(rename = "LEO")]
    Leo,
    #[serde(rename = "MEO")]
    Meo,
    #[serde(rename = "GEO")]
    Geo,
    #[serde(rename = "HEO")]
    Heo,
}

impl OrbitRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitRegime::Leo => "LEO",
            OrbitRegime::Meo => "MEO",
            OrbitRegime::Geo => "GEO",
            OrbitRegime::Heo => "HEO",
        }
    }
}

impl std::fmt::Display for OrbitRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Altitude and regime derived from mean motion.
///
/// Both are absent when the mean motion was absent, non-positive, or the
/// arithmetic did not produce a finite altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedOrbit {
    pub altitude_km: Option<f64>,
    pub regime: Option<OrbitRegime>,
}

/// Physical constants used by every orbital computation.
///
/// Passed by reference into each calculation instead of living in shared
/// state, so results never depend on call order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarthModel {
    /// Gravitational parameter (km^3/s^2)
    pub mu_km3_s2: f64,
    /// Equatorial radius (km)
    pub radius_km: f64,
}

impl EarthModel {
    /// Standard gravitational parameter with the WGS84 equatorial radius
    pub const STANDARD: EarthModel = EarthModel {
        mu_km3_s2: 398_600.4418,
        radius_km: 6378.137,
    };
}

impl Default for EarthModel {
    fn default() -> Self {
        Self::STANDARD
    }
}
