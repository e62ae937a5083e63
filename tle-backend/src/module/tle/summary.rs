//! Orbit shape summary and the time grid handed to an external propagator

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use tle_common::EarthModel;

use super::classifier::semi_major_axis_km;

/// Default spacing of propagation samples
pub const DEFAULT_STEP_SECONDS: f64 = 100.0;

/// Size and period of an orbit derived from mean motion and eccentricity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSummary {
    pub semi_major_axis_km: f64,
    pub period_seconds: f64,
    /// Perigee altitude above the Earth's radius
    pub perigee_km: f64,
    /// Apogee altitude above the Earth's radius
    pub apogee_km: f64,
}

impl OrbitSummary {
    /// `None` when mean motion is unusable or eccentricity is outside [0, 1)
    pub fn from_elements(
        mean_motion_rev_per_day: Option<f64>,
        eccentricity: Option<f64>,
        earth: &EarthModel,
    ) -> Option<Self> {
        let a = semi_major_axis_km(mean_motion_rev_per_day, earth)?;
        let e = eccentricity.filter(|e| (0.0..1.0).contains(e))?;

        Some(Self {
            semi_major_axis_km: a,
            period_seconds: 2.0 * PI * (a.powi(3) / earth.mu_km3_s2).sqrt(),
            perigee_km: a * (1.0 - e) - earth.radius_km,
            apogee_km: a * (1.0 + e) - earth.radius_km,
        })
    }

    pub fn period_minutes(&self) -> f64 {
        self.period_seconds / 60.0
    }
}

/// Upper bound on the number of samples in one schedule
pub const MAX_SCHEDULE_STEPS: u64 = 100_000;

/// Sample times covering one orbital period from `epoch`, `step_seconds` apart.
///
/// The period end itself is excluded. Empty when either duration is not a
/// positive finite number, or when the grid would exceed [`MAX_SCHEDULE_STEPS`].
pub fn propagation_schedule(
    epoch: DateTime<Utc>,
    period_seconds: f64,
    step_seconds: f64,
) -> Vec<DateTime<Utc>> {
    if !(period_seconds.is_finite() && period_seconds > 0.0)
        || !(step_seconds.is_finite() && step_seconds > 0.0)
    {
        return Vec::new();
    }

    let steps = (period_seconds / step_seconds).ceil();
    if steps > MAX_SCHEDULE_STEPS as f64 {
        tracing::warn!(
            "Schedule of {:.0} steps ({}s period, {}s step) exceeds {}, skipped",
            steps,
            period_seconds,
            step_seconds,
            MAX_SCHEDULE_STEPS
        );
        return Vec::new();
    }

    let steps = steps as u64;
    (0..steps)
        .filter_map(|i| {
            let offset_ms = (i as f64 * step_seconds * 1000.0).round() as i64;
            epoch.checked_add_signed(Duration::milliseconds(offset_ms))
        })
        .collect()
}
