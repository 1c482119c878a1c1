//! GNSS Mechanics Library
//!
//! Element-set parsing, SGP4 propagation adapter, and coordinate frame
//! transforms for navigation satellite constellations.
//!
//! This crate wraps the external `sgp4` routine: it owns the epoch-delta
//! bookkeeping and the TEME → ECEF → geodetic conversion chain, not the
//! propagation mathematics itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod propagation;
pub mod tle;
pub mod transforms;

pub use propagation::propagate;
pub use tle::{parse_element_sets, ParsedElementSet, RawElementSet, SatelliteInfo};

#[derive(Error, Debug)]
pub enum OrbitalError {
    #[error("Invalid TLE format: {0}")]
    InvalidTle(String),
    #[error("Propagation failed: {0}")]
    PropagationFailed(String),
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

/// Geodetic position relative to the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeodeticPosition {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

/// Satellite state at one scene instant.
///
/// Position is Earth-fixed (ECEF, meters); velocity is left in the SGP4
/// output frame (TEME, km/s) for the renderer's orbit-tangent display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PropagatedState {
    pub position_m: [f64; 3],
    pub geodetic: GeodeticPosition,
    pub velocity_km_s: [f64; 3],
    /// Half-angle of the circular ground footprint, in degrees.
    pub coverage_angle_deg: f64,
}
