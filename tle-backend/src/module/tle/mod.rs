//! TLE parsing and orbital classification
//!
//! ## Pipeline
//! - `extractor`: raw lines -> `TleRecord` triplets (resynchronizing scan)
//! - `parser`: fixed-column fields -> `OrbitalElements`
//! - `classifier`: mean motion -> altitude -> `OrbitRegime`
//! - `summary`: perigee/apogee/period and the propagation time grid
//!
//! Everything in here is pure and synchronous.

mod classifier;
mod extractor;
mod parser;
mod summary;

pub use classifier::{
    GEO_ALTITUDE_KM, GEO_WINDOW_KM, LEO_CEILING_KM, altitude_from_mean_motion, classify,
    classify_regime, semi_major_axis_km,
};
pub use extractor::{
    MIN_TLE_LINE_LEN, TripletExtractor, extract_from_text, extract_triplets, is_line1, is_line2,
    split_lines,
};
pub use parser::{
    Line2Extras, MIN_LINE2_LEN, parse_elements, parse_epoch, parse_line2, parse_line2_extras,
    parse_norad_id,
};
pub use summary::{DEFAULT_STEP_SECONDS, MAX_SCHEDULE_STEPS, OrbitSummary, propagation_schedule};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tle_common::{EarthModel, OrbitRegime, TleRecord};

/// Everything derived from one record, flattened for tabular output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedOrbit {
    pub group: String,
    pub name: String,
    pub norad_id: Option<u32>,
    pub epoch: Option<DateTime<Utc>>,
    pub inclination_deg: Option<f64>,
    pub mean_motion_rev_per_day: Option<f64>,
    pub eccentricity: Option<f64>,
    pub altitude_km: Option<f64>,
    pub perigee_km: Option<f64>,
    pub apogee_km: Option<f64>,
    pub period_min: Option<f64>,
    pub regime: Option<OrbitRegime>,
}

/// Run one record through parser, classifier and summary
pub fn analyze(record: &TleRecord, earth: &EarthModel) -> DerivedOrbit {
    let elements = parse_elements(&record.line1, &record.line2);
    let extras = parse_line2_extras(&record.line2);
    let orbit = classify(elements.mean_motion_rev_per_day, earth);
    let summary =
        OrbitSummary::from_elements(elements.mean_motion_rev_per_day, extras.eccentricity, earth);

    DerivedOrbit {
        group: record.source_group.clone(),
        name: record.name.clone(),
        norad_id: elements.norad_id,
        epoch: parse_epoch(&record.line1),
        inclination_deg: elements.inclination_deg,
        mean_motion_rev_per_day: elements.mean_motion_rev_per_day,
        eccentricity: extras.eccentricity,
        altitude_km: orbit.altitude_km,
        perigee_km: summary.map(|s| s.perigee_km),
        apogee_km: summary.map(|s| s.apogee_km),
        period_min: summary.map(|s| s.period_minutes()),
        regime: orbit.regime,
    }
}
