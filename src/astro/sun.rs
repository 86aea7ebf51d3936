//! Solar coordinates and sunrise/sunset.

use super::{days_since_j2000, declination, from_julian, right_ascension, Equatorial, J2000};
use chrono::{DateTime, Utc};
use std::f64::consts::{PI, TAU};

/// Apparent altitude of the upper limb at sunrise/sunset, degrees.
const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

const J0: f64 = 0.0009;

pub(crate) fn solar_mean_anomaly(days: f64) -> f64 {
    (357.5291 + 0.985_600_28 * days).to_radians()
}

pub(crate) fn ecliptic_longitude(mean_anomaly: f64) -> f64 {
    let m = mean_anomaly;
    let center = (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin()).to_radians();
    let perihelion = 102.9372_f64.to_radians();
    m + center + perihelion + PI
}

pub fn sun_coords(days: f64) -> Equatorial {
    let l = ecliptic_longitude(solar_mean_anomaly(days));
    Equatorial {
        right_ascension: right_ascension(l, 0.0),
        declination: declination(l, 0.0),
    }
}

/// Geocentric ecliptic longitude of the Sun in degrees [0, 360).
pub fn sun_longitude_deg(instant: &DateTime<Utc>) -> f64 {
    let l = ecliptic_longitude(solar_mean_anomaly(days_since_j2000(instant)));
    super::normalize_deg(l.to_degrees())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub solar_noon: Option<DateTime<Utc>>,
    /// `None` during polar night or midnight sun.
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

fn julian_cycle(days: f64, lw: f64) -> f64 {
    (days - J0 - lw / TAU).round()
}

fn approx_transit(hour_angle: f64, lw: f64, cycle: f64) -> f64 {
    J0 + (hour_angle + lw) / TAU + cycle
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// NaN when the Sun never reaches altitude `h`.
fn hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

/// Sunrise, solar noon and sunset for the solar day containing `instant`.
pub fn sun_times(instant: &DateTime<Utc>, latitude: f64, longitude: f64) -> SunTimes {
    let lw = (-longitude).to_radians();
    let phi = latitude.to_radians();
    let days = days_since_j2000(instant);

    let cycle = julian_cycle(days, lw);
    let ds = approx_transit(0.0, lw, cycle);
    let m = solar_mean_anomaly(ds);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);
    let j_noon = solar_transit_j(ds, m, l);

    let w = hour_angle(SUNRISE_ALTITUDE_DEG.to_radians(), phi, dec);
    let j_set = solar_transit_j(approx_transit(w, lw, cycle), m, l);
    let j_rise = j_noon - (j_set - j_noon);

    SunTimes {
        solar_noon: from_julian(j_noon),
        sunrise: from_julian(j_rise),
        sunset: from_julian(j_set),
    }
}
