//! Low-precision analytical model of the Sun and Moon.
//!
//! Positions follow the classic short series for solar mean anomaly and
//! lunar mean elements (accuracy on the order of a few arcminutes, rise/set
//! within a couple of minutes at moderate latitudes). Everything here is
//! pure: the same instant and observer always produce the same numbers.

pub mod moon;
pub mod sun;

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;

/// Obliquity of the ecliptic at J2000, radians.
pub(crate) const OBLIQUITY: f64 = 23.4397 * PI / 180.0;

pub fn to_julian(instant: &DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

/// `None` when `jd` is not finite (a rise/set that does not occur).
pub fn from_julian(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd + 0.5 - J1970) * DAY_MS).round();
    DateTime::from_timestamp_millis(millis as i64)
}

/// Days since J2000.0.
pub fn days_since_j2000(instant: &DateTime<Utc>) -> f64 {
    to_julian(instant) - J2000
}

/// Equatorial coordinates, radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub right_ascension: f64,
    pub declination: f64,
}

pub(crate) fn right_ascension(lon: f64, lat: f64) -> f64 {
    (lon.sin() * OBLIQUITY.cos() - lat.tan() * OBLIQUITY.sin()).atan2(lon.cos())
}

pub(crate) fn declination(lon: f64, lat: f64) -> f64 {
    (lat.sin() * OBLIQUITY.cos() + lat.cos() * OBLIQUITY.sin() * lon.sin()).asin()
}

/// Azimuth measured from south, positive westward.
pub(crate) fn azimuth(hour_angle: f64, phi: f64, dec: f64) -> f64 {
    hour_angle
        .sin()
        .atan2(hour_angle.cos() * phi.sin() - dec.tan() * phi.cos())
}

pub(crate) fn altitude(hour_angle: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos()).asin()
}

/// Local sidereal time, radians; `lw` is west longitude in radians.
pub(crate) fn sidereal_time(days: f64, lw: f64) -> f64 {
    (280.16 + 360.985_623_5 * days).to_radians() - lw
}

/// Atmospheric refraction for an apparent altitude in radians.
pub(crate) fn astro_refraction(h: f64) -> f64 {
    let h = h.max(0.0);
    0.000_296_7 / (h + 0.003_125_36 / (h + 0.089_011_79)).tan()
}

/// Normalize an angle to [0, 360) degrees.
pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_julian_round_trip_at_j2000() {
        let noon = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((to_julian(&noon) - J2000).abs() < 1e-9);
        assert_eq!(from_julian(J2000), Some(noon));
        assert!(days_since_j2000(&noon).abs() < 1e-9);
    }

    #[test]
    fn test_from_julian_rejects_nan() {
        assert_eq!(from_julian(f64::NAN), None);
    }

    #[test]
    fn test_normalize_deg() {
        assert_eq!(normalize_deg(-30.0), 330.0);
        assert_eq!(normalize_deg(720.5), 0.5);
    }
}
