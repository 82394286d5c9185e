use chrono::{DateTime, Timelike, Utc};
use nalgebra::{Rotation3, Vector3};

use crate::geo::CartesianPoint;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Approximate rotation of the sun around the Earth, in degrees.
///
/// Only the UTC time of day is used, so the sub-solar point always sits on the
/// equator. Sub-second precision is dropped.
pub fn solar_angle(time: DateTime<Utc>) -> f64 {
    let seconds_elapsed = time.num_seconds_from_midnight() as f64;
    360.0 * (seconds_elapsed / SECONDS_PER_DAY)
}

/// Longitude of the sub-solar point implied by `angle`.
pub fn sub_solar_longitude(angle: f64) -> f64 {
    let lon = (180.0 - angle).rem_euclid(360.0);
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Position of the light source for a given solar angle.
///
/// The sun hangs off an anchor at `(0, 0, distance)`. The anchor is turned
/// -90 degrees about +y to put the sun over longitude 180 at UTC midnight, then
/// by `-angle` to reach the current time.
pub fn sun_position(angle: f64, distance: f64) -> CartesianPoint {
    let midnight = Rotation3::from_axis_angle(&Vector3::y_axis(), (-90.0_f64).to_radians());
    let now = Rotation3::from_axis_angle(&Vector3::y_axis(), (-angle).to_radians());
    let anchor = midnight * now;

    CartesianPoint::from(anchor * Vector3::new(0.0, 0.0, distance))
}

/// Clock label shown next to the ISS coordinates.
pub fn utc_label(time: DateTime<Utc>) -> String {
    format!(
        "At UTC: {:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::geo_to_cartesian;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, h, m, s).unwrap()
    }

    #[test]
    fn test_midnight_and_noon() {
        assert_eq!(solar_angle(at(0, 0, 0)), 0.0);
        assert_eq!(solar_angle(at(12, 0, 0)), 180.0);
        assert_eq!(solar_angle(at(6, 0, 0)), 90.0);
    }

    #[test]
    fn test_monotonic_within_day_and_wraps() {
        let start = at(0, 0, 0);
        let mut previous = solar_angle(start);
        for minute in 1..(24 * 60) {
            let angle = solar_angle(start + chrono::Duration::minutes(minute));
            assert!(angle >= previous);
            assert!(angle < 360.0);
            previous = angle;
        }

        let last = solar_angle(at(23, 59, 59));
        let next_day = solar_angle(at(23, 59, 59) + chrono::Duration::seconds(1));
        assert!(last > 359.9);
        assert_eq!(next_day, 0.0);
    }

    #[test]
    fn test_subsecond_ignored() {
        let t = at(12, 0, 0) + chrono::Duration::milliseconds(999);
        assert_eq!(solar_angle(t), 180.0);
    }

    #[test]
    fn test_sun_position_matches_sub_solar_point() {
        for angle in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let sun = sun_position(angle, 110.0);
            let expected = geo_to_cartesian(0.0, sub_solar_longitude(angle), 110.0);
            assert!((sun.x - expected.x).abs() < 1e-9, "angle {}", angle);
            assert!((sun.y - expected.y).abs() < 1e-9, "angle {}", angle);
            assert!((sun.z - expected.z).abs() < 1e-9, "angle {}", angle);
        }
    }

    #[test]
    fn test_sun_over_antimeridian_at_midnight() {
        let sun = sun_position(solar_angle(at(0, 0, 0)), 110.0);
        assert!((sun.x + 110.0).abs() < 1e-9);
        assert!(sun.z.abs() < 1e-9);
        assert_eq!(sub_solar_longitude(0.0), 180.0);
        assert_eq!(sub_solar_longitude(180.0), 0.0);
        assert_eq!(sub_solar_longitude(270.0), -90.0);
    }

    #[test]
    fn test_utc_label_zero_pads() {
        assert_eq!(utc_label(at(3, 4, 5)), "At UTC: 03:04:05");
        assert_eq!(utc_label(at(23, 59, 59)), "At UTC: 23:59:59");
    }
}
