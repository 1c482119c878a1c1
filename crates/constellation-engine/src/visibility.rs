//! Observer-relative visibility evaluation.
//!
//! A satellite is visible when the great-circle distance between its
//! ground subpoint and the observer is inside the footprint radius
//! derived from its coverage angle. No observer means the aggregate
//! count is `None`: "no observer selected", not "zero visible".

use serde::{Deserialize, Serialize};

use gnss_mechanics::transforms::{footprint_radius_m, surface_distance_m};

use crate::catalog::SatelliteRecord;

/// Ground point visibility is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

/// Update every record's visibility flag and return the aggregate count,
/// `None` when no observer is set.
pub fn evaluate(
    records: &mut [SatelliteRecord],
    observer: Option<ObserverPoint>,
) -> Option<usize> {
    let Some(observer) = observer else {
        for record in records.iter_mut() {
            record.is_visible = false;
        }
        return None;
    };

    let mut visible = 0;
    for record in records.iter_mut() {
        let subpoint = record.state.geodetic;
        let distance = surface_distance_m(
            subpoint.latitude_deg,
            subpoint.longitude_deg,
            observer.lat_deg,
            observer.lon_deg,
        );
        record.is_visible = distance <= footprint_radius_m(record.state.coverage_angle_deg);
        if record.is_visible {
            visible += 1;
        }
    }

    Some(visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss_mechanics::{parse_element_sets, GeodeticPosition};

    const GPS_BLOCK: &str = "GPS BIIR-2  (PRN 13)\n\
        1 24876U 97035A   26100.50000000  .00000000  00000-0  00000-0 0  9995\n\
        2 24876  55.6354 161.1301 0082270  53.5473 307.2167  2.00561258209541\n";

    /// A record pinned to an arbitrary subpoint and altitude.
    fn record_at(lon_deg: f64, lat_deg: f64, altitude_m: f64) -> SatelliteRecord {
        let parsed = parse_element_sets(GPS_BLOCK).remove(0);
        let coverage_angle_deg = gnss_mechanics::propagation::coverage_angle_deg(altitude_m);
        SatelliteRecord {
            info: parsed.info,
            elements: parsed.elements,
            state: gnss_mechanics::PropagatedState {
                position_m: [0.0; 3],
                geodetic: GeodeticPosition {
                    longitude_deg: lon_deg,
                    latitude_deg: lat_deg,
                    altitude_m,
                },
                velocity_km_s: [0.0; 3],
                coverage_angle_deg,
            },
            is_visible: false,
            is_selected: false,
        }
    }

    #[test]
    fn no_observer_yields_null_count() {
        let mut records = vec![record_at(0.0, 0.0, 20_200_000.0)];
        records[0].is_visible = true;

        assert_eq!(evaluate(&mut records, None), None);
        assert!(!records[0].is_visible);
    }

    #[test]
    fn satellite_directly_overhead_is_visible() {
        // Subpoint and observer coincide: distance 0 <= any footprint.
        let mut records = vec![record_at(0.0, 0.0, 20_200_000.0)];
        let count = evaluate(
            &mut records,
            Some(ObserverPoint {
                lon_deg: 0.0,
                lat_deg: 0.0,
            }),
        );

        assert_eq!(count, Some(1));
        assert!(records[0].is_visible);
    }

    #[test]
    fn antipodal_satellite_is_not_visible() {
        let mut records = vec![record_at(180.0, 0.0, 20_200_000.0)];
        let count = evaluate(
            &mut records,
            Some(ObserverPoint {
                lon_deg: 0.0,
                lat_deg: 0.0,
            }),
        );

        assert_eq!(count, Some(0));
        assert!(!records[0].is_visible);
    }

    #[test]
    fn count_is_bounded_by_record_count() {
        let mut records = vec![
            record_at(0.0, 0.0, 20_200_000.0),
            record_at(10.0, 10.0, 20_200_000.0),
            record_at(180.0, 0.0, 20_200_000.0),
        ];
        let count = evaluate(
            &mut records,
            Some(ObserverPoint {
                lon_deg: 0.0,
                lat_deg: 0.0,
            }),
        )
        .unwrap();

        assert!(count <= records.len());
        assert_eq!(count, 2);
    }

    #[test]
    fn grounded_satellite_covers_nothing_away_from_itself() {
        let mut records = vec![record_at(1.0, 0.0, 0.0)];
        let count = evaluate(
            &mut records,
            Some(ObserverPoint {
                lon_deg: 0.0,
                lat_deg: 0.0,
            }),
        );

        assert_eq!(count, Some(0));
    }
}
