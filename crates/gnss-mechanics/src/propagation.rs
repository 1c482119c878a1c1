//! Orbital propagator adapter.
//!
//! Wraps the external SGP4 routine: epoch-delta computation in, TEME
//! position/velocity out, then the frame chain down to geodetic
//! coordinates and the ground-footprint half angle. Identical inputs
//! always yield identical output.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::transforms::{self, EARTH_MEAN_RADIUS_M};
use crate::{OrbitalError, PropagatedState, Result};

/// Elapsed minutes between the element set's stored epoch and `scene_time`.
///
/// May be negative (instant before epoch) or arbitrarily large; validity
/// windows are the external routine's concern, not ours.
pub fn minutes_since_epoch(elements: &sgp4::Elements, scene_time: DateTime<Utc>) -> f64 {
    let epoch = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);
    scene_time.signed_duration_since(epoch).num_milliseconds() as f64 / 60_000.0
}

/// Half-angle of the circular ground footprint for a satellite at
/// `altitude_m`, degrees.
///
/// Flat-horizon tangent-circle approximation, not a radio-horizon model.
/// Downstream visibility semantics depend on this exact formula.
pub fn coverage_angle_deg(altitude_m: f64) -> f64 {
    let r = EARTH_MEAN_RADIUS_M;
    let h = altitude_m;
    2.0 * ((2.0 * r * h + h * h).sqrt() / (r + h)).asin().to_degrees()
}

/// Propagate one element set to `scene_time`.
pub fn propagate(elements: &sgp4::Elements, scene_time: DateTime<Utc>) -> Result<PropagatedState> {
    let constants = sgp4::Constants::from_elements(elements)
        .map_err(|e| OrbitalError::PropagationFailed(format!("{:?}", e)))?;

    let prediction = constants
        .propagate(minutes_since_epoch(elements, scene_time))
        .map_err(|e| OrbitalError::PropagationFailed(format!("{:?}", e)))?;

    // SGP4 reports kilometers in the TEME frame.
    let teme_m = Vector3::from(prediction.position) * 1000.0;
    let ecef_m = transforms::teme_to_ecef(teme_m, transforms::gmst(scene_time));
    let geodetic = transforms::ecef_to_geodetic(ecef_m);

    Ok(PropagatedState {
        position_m: ecef_m.into(),
        geodetic,
        velocity_km_s: prediction.velocity,
        coverage_angle_deg: coverage_angle_deg(geodetic.altitude_m),
    })
}
