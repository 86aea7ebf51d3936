//! Lunar coordinates, topocentric position, illumination and rise/set.

use super::sun::sun_coords;
use super::{
    altitude, astro_refraction, azimuth, days_since_j2000, declination, right_ascension,
    sidereal_time,
};
use crate::domain::model::MoonPosition;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::f64::consts::PI;

/// Mean Earth-Sun distance, km.
const SUN_DISTANCE_KM: f64 = 149_598_000.0;

/// Altitude correction for the Moon's rise/set (parallax less semidiameter), radians.
const MOON_HORIZON: f64 = 0.133 * PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct MoonCoords {
    ecliptic_longitude: f64,
    right_ascension: f64,
    declination: f64,
    distance_km: f64,
}

fn moon_coords(days: f64) -> MoonCoords {
    let mean_longitude = (218.316 + 13.176_396 * days).to_radians();
    let mean_anomaly = (134.963 + 13.064_993 * days).to_radians();
    let argument_of_latitude = (93.272 + 13.229_350 * days).to_radians();

    let l = mean_longitude + 6.289_f64.to_radians() * mean_anomaly.sin();
    let b = 5.128_f64.to_radians() * argument_of_latitude.sin();

    MoonCoords {
        ecliptic_longitude: l,
        right_ascension: right_ascension(l, b),
        declination: declination(l, b),
        distance_km: 385_001.0 - 20_905.0 * mean_anomaly.cos(),
    }
}

/// Geocentric ecliptic longitude of the Moon in degrees [0, 360).
pub fn moon_longitude_deg(instant: &DateTime<Utc>) -> f64 {
    let coords = moon_coords(days_since_j2000(instant));
    super::normalize_deg(coords.ecliptic_longitude.to_degrees())
}

/// Refraction-corrected altitude, azimuth from south and distance.
pub fn moon_position(instant: &DateTime<Utc>, latitude: f64, longitude: f64) -> MoonPosition {
    let lw = (-longitude).to_radians();
    let phi = latitude.to_radians();
    let days = days_since_j2000(instant);

    let coords = moon_coords(days);
    let hour_angle = sidereal_time(days, lw) - coords.right_ascension;
    let h = altitude(hour_angle, phi, coords.declination);

    MoonPosition {
        altitude: h + astro_refraction(h),
        azimuth: azimuth(hour_angle, phi, coords.declination),
        distance_km: coords.distance_km,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonIllumination {
    /// Illuminated fraction of the disc in [0, 1].
    pub fraction: f64,
    /// 0 = new, 0.25 = first quarter, 0.5 = full, 0.75 = last quarter.
    pub phase: f64,
    /// Midpoint angle of the bright limb, radians.
    pub angle: f64,
}

pub fn moon_illumination(instant: &DateTime<Utc>) -> MoonIllumination {
    let days = days_since_j2000(instant);
    let sun = sun_coords(days);
    let moon = moon_coords(days);

    let ra_diff = sun.right_ascension - moon.right_ascension;
    let elongation = (sun.declination.sin() * moon.declination.sin()
        + sun.declination.cos() * moon.declination.cos() * ra_diff.cos())
    .acos();
    let incidence = (SUN_DISTANCE_KM * elongation.sin())
        .atan2(moon.distance_km - SUN_DISTANCE_KM * elongation.cos());
    let angle = (sun.declination.cos() * ra_diff.sin()).atan2(
        sun.declination.sin() * moon.declination.cos()
            - sun.declination.cos() * moon.declination.sin() * ra_diff.cos(),
    );

    let sign = if angle < 0.0 { -1.0 } else { 1.0 };
    MoonIllumination {
        fraction: (1.0 + incidence.cos()) / 2.0,
        phase: 0.5 + 0.5 * incidence * sign / PI,
        angle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoonTimes {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    /// Set when neither event occurs: whether the Moon stays above the horizon.
    pub always_up: bool,
    pub always_down: bool,
}

fn hours_later(start: &DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    *start + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Moonrise and moonset during the UTC day `date`.
///
/// Scans the day in two-hour windows, fitting a parabola through the
/// altitude at each window's ends and midpoint and solving for its roots.
pub fn moon_times(date: NaiveDate, latitude: f64, longitude: f64) -> MoonTimes {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let altitude_at = |hours: f64| {
        moon_position(&hours_later(&start, hours), latitude, longitude).altitude - MOON_HORIZON
    };

    let mut h0 = altitude_at(0.0);
    let mut rise: Option<f64> = None;
    let mut set: Option<f64> = None;
    let mut ye = 0.0;

    let mut i = 1.0;
    while i <= 24.0 {
        let h1 = altitude_at(i);
        let h2 = altitude_at(i + 1.0);

        let a = (h0 + h2) / 2.0 - h1;
        let b = (h2 - h0) / 2.0;
        let xe = -b / (2.0 * a);
        ye = (a * xe + b) * xe + h1;
        let d = b * b - 4.0 * a * h1;

        let mut roots = 0;
        let mut x1 = 0.0;
        let mut x2 = 0.0;
        if d >= 0.0 {
            let dx = d.sqrt() / (a.abs() * 2.0);
            x1 = xe - dx;
            x2 = xe + dx;
            if x1.abs() <= 1.0 {
                roots += 1;
            }
            if x2.abs() <= 1.0 {
                roots += 1;
            }
            if x1 < -1.0 {
                x1 = x2;
            }
        }

        if roots == 1 {
            if h0 < 0.0 {
                rise = Some(i + x1);
            } else {
                set = Some(i + x1);
            }
        } else if roots == 2 {
            rise = Some(i + if ye < 0.0 { x2 } else { x1 });
            set = Some(i + if ye < 0.0 { x1 } else { x2 });
        }

        if rise.is_some() && set.is_some() {
            break;
        }
        h0 = h2;
        i += 2.0;
    }

    let neither = rise.is_none() && set.is_none();
    MoonTimes {
        rise: rise.map(|h| hours_later(&start, h)),
        set: set.map(|h| hours_later(&start, h)),
        always_up: neither && ye > 0.0,
        always_down: neither && ye <= 0.0,
    }
}
