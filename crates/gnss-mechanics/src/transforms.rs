//! Coordinate frame transforms and surface geometry.
//!
//! SGP4 output lives in the TEME inertial frame; the renderer and the
//! visibility math want Earth-fixed and geodetic coordinates. The chain
//! here is TEME --(GMST rotation)--> ECEF --(WGS84)--> lon/lat/alt.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::GeodeticPosition;

/// Earth mean radius, meters. Used for footprint geometry and surface
/// distances; the geodetic conversion uses the WGS84 ellipsoid instead.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 semi-major axis, meters.
pub const WGS84_A_M: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const JD_UNIX_EPOCH: f64 = 2_440_587.5;
const JD_J2000: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
const GMST_BASE_DEG: f64 = 280.460_618_37;
const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
const GMST_T2_COEFF: f64 = 0.000_387_933;
const GMST_T3_DIVISOR: f64 = 38_710_000.0;

/// Greenwich Mean Sidereal Time at `at`, radians normalized to [0, 2π).
pub fn gmst(at: DateTime<Utc>) -> f64 {
    let jd = at.timestamp_millis() as f64 / 86_400_000.0 + JD_UNIX_EPOCH;
    let days = jd - JD_J2000;
    let t = days / DAYS_PER_JULIAN_CENTURY;

    let gmst_deg = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days
        + GMST_T2_COEFF * t * t
        - t * t * t / GMST_T3_DIVISOR;

    gmst_deg.rem_euclid(360.0).to_radians()
}

/// Rotate a TEME position into the Earth-fixed frame.
pub fn teme_to_ecef(teme: Vector3<f64>, gmst_rad: f64) -> Vector3<f64> {
    let (sin_t, cos_t) = gmst_rad.sin_cos();
    Vector3::new(
        cos_t * teme.x + sin_t * teme.y,
        -sin_t * teme.x + cos_t * teme.y,
        teme.z,
    )
}

/// Convert an ECEF position (meters) to WGS84 geodetic coordinates.
pub fn ecef_to_geodetic(ecef_m: Vector3<f64>) -> GeodeticPosition {
    let a = WGS84_A_M;
    let b = a * (1.0 - WGS84_F);
    let e2 = 1.0 - (b * b) / (a * a);
    let ep2 = (a * a) / (b * b) - 1.0;

    let longitude_deg = ecef_m.y.atan2(ecef_m.x).to_degrees();

    let p = (ecef_m.x * ecef_m.x + ecef_m.y * ecef_m.y).sqrt();
    if p < 1e-9 {
        // On the polar axis the longitude is arbitrary and the Bowring
        // step degenerates.
        return GeodeticPosition {
            longitude_deg: 0.0,
            latitude_deg: 90.0_f64.copysign(ecef_m.z),
            altitude_m: ecef_m.z.abs() - b,
        };
    }

    // Bowring's closed-form approximation.
    let theta = (ecef_m.z * a).atan2(p * b);
    let (sin_theta, cos_theta) = theta.sin_cos();
    let lat_rad = (ecef_m.z + ep2 * b * sin_theta.powi(3))
        .atan2(p - e2 * a * cos_theta.powi(3));

    let n = a / (1.0 - e2 * lat_rad.sin().powi(2)).sqrt();
    let altitude_m = p / lat_rad.cos() - n;

    GeodeticPosition {
        longitude_deg,
        latitude_deg: lat_rad.to_degrees(),
        altitude_m,
    }
}

/// Convert WGS84 geodetic coordinates to an ECEF position (meters).
pub fn geodetic_to_ecef(pos: GeodeticPosition) -> Vector3<f64> {
    let lat = pos.latitude_deg.to_radians();
    let lon = pos.longitude_deg.to_radians();
    let alt = pos.altitude_m;

    let e2 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
    let n = WGS84_A_M / (1.0 - e2 * lat.sin().powi(2)).sqrt();

    Vector3::new(
        (n + alt) * lat.cos() * lon.cos(),
        (n + alt) * lat.cos() * lon.sin(),
        (n * (1.0 - e2) + alt) * lat.sin(),
    )
}

/// Great-circle surface distance between two ground points, meters.
///
/// Spherical law of cosines on the mean-radius sphere. The cosine
/// argument is clamped so coincident points never fall out of the acos
/// domain through floating-point drift.
pub fn surface_distance_m(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlon = (lon1_deg - lon2_deg).to_radians();

    let central = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos())
        .clamp(-1.0, 1.0)
        .acos();

    EARTH_MEAN_RADIUS_M * central
}

/// Arc length on the ground corresponding to the half coverage angle, meters.
pub fn footprint_radius_m(coverage_angle_deg: f64) -> f64 {
    std::f64::consts::PI * EARTH_MEAN_RADIUS_M * coverage_angle_deg / 360.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn gmst_is_normalized() {
        let at = Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap();
        let theta = gmst(at);
        assert!((0.0..std::f64::consts::TAU).contains(&theta));
    }

    #[test]
    fn gmst_advances_with_sidereal_rate() {
        // One sidereal day later the angle comes back around (~23h56m).
        let t0 = Utc.with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::milliseconds(86_164_091);
        let diff = (gmst(t1) - gmst(t0)).abs();
        assert!(diff < 1e-3 || (std::f64::consts::TAU - diff) < 1e-3);
    }

    #[test]
    fn teme_to_ecef_identity_at_zero_rotation() {
        let p = Vector3::new(7_000_000.0, 1_000_000.0, -2_000_000.0);
        assert_eq!(teme_to_ecef(p, 0.0), p);
    }

    #[test]
    fn teme_to_ecef_quarter_turn() {
        let p = Vector3::new(7_000_000.0, 0.0, 0.0);
        let rotated = teme_to_ecef(p, std::f64::consts::FRAC_PI_2);
        assert!(rotated.x.abs() < 1e-3);
        assert!((rotated.y + 7_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let ecef = geodetic_to_ecef(GeodeticPosition {
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            altitude_m: 0.0,
        });
        assert!((ecef.x - WGS84_A_M).abs() < 1e-6);
        assert!(ecef.y.abs() < 1e-6);
        assert!(ecef.z.abs() < 1e-6);
    }

    #[test]
    fn surface_distance_zero_for_coincident_points() {
        assert_eq!(surface_distance_m(0.0, 0.0, 0.0, 0.0), 0.0);
        // Away from the equator the clamped cosine may sit one ulp off 1.
        assert!(surface_distance_m(12.5, -33.25, 12.5, -33.25) < 1e-3);
    }

    #[test]
    fn surface_distance_quarter_circumference() {
        let d = surface_distance_m(0.0, 0.0, 0.0, 90.0);
        assert!((d - 10_007_543.398_010_286).abs() < 1.0);
    }

    #[test]
    fn footprint_radius_matches_arc_formula() {
        let cov = 30.0;
        let expected = std::f64::consts::PI * EARTH_MEAN_RADIUS_M * cov / 360.0;
        assert_eq!(footprint_radius_m(cov), expected);
    }

    #[test]
    fn geodetic_round_trip_at_navigation_altitude() {
        // The closed-form inverse loses some precision this far out;
        // a quarter meter over 20,200 km is well inside display tolerance.
        let original = GeodeticPosition {
            longitude_deg: -74.5,
            latitude_deg: 41.3,
            altitude_m: 20_200_000.0,
        };
        let back = ecef_to_geodetic(geodetic_to_ecef(original));
        assert!((back.longitude_deg - original.longitude_deg).abs() < 1e-6);
        assert!((back.latitude_deg - original.latitude_deg).abs() < 1e-5);
        assert!((back.altitude_m - original.altitude_m).abs() < 1.0);
    }

    proptest! {
        // Round trip near the reference ellipsoid.
        #[test]
        fn geodetic_round_trip(
            lon in -179.9f64..179.9,
            lat in -85.0f64..85.0,
            alt in 0.0f64..500_000.0,
        ) {
            let original = GeodeticPosition {
                longitude_deg: lon,
                latitude_deg: lat,
                altitude_m: alt,
            };
            let back = ecef_to_geodetic(geodetic_to_ecef(original));

            prop_assert!((back.longitude_deg - lon).abs() < 1e-6);
            prop_assert!((back.latitude_deg - lat).abs() < 1e-6);
            prop_assert!((back.altitude_m - alt).abs() < 1e-2);
        }
    }
}
