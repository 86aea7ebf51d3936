//! Deterministic stand-in for a provider chart.
//!
//! Sun and Moon come from the local astronomical model and the ascendant from
//! local sidereal time, so those three are roughly right. The remaining bodies
//! are placed from a hash of the inputs and carry no astronomical meaning.

use crate::astro::moon::moon_longitude_deg;
use crate::astro::sun::sun_longitude_deg;
use crate::astro::{days_since_j2000, normalize_deg, sidereal_time, OBLIQUITY};
use crate::core::calendar::{round_to, ZODIAC_SIGNS};
use crate::domain::model::{
    iso_instant, ChartLocation, ChartPoint, ChartSource, ChartSummary, GeoPlace, HouseCusp,
    NatalChart, PlanetPlacement,
};
use chrono::{DateTime, Utc};

pub const MOCK_SYSTEM: &str = "Tropical / Equal (mock)";
pub const DEFAULT_NAME: &str = "Luna";

const MOCK_NOTES: &str =
    "Generated locally without a chart service; only Sun, Moon and rising are astronomically derived.";

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seeded bodies with the maximum elongation from the Sun they may take;
/// `None` means anywhere on the ecliptic.
const SEEDED_BODIES: [(&str, Option<f64>); 8] = [
    ("Mercury", Some(28.0)),
    ("Venus", Some(47.0)),
    ("Mars", None),
    ("Jupiter", None),
    ("Saturn", None),
    ("Uranus", None),
    ("Neptune", None),
    ("Pluto", None),
];

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Seed over everything that identifies a birth: name, place and instant.
pub fn chart_seed(name: &str, latitude: f64, longitude: f64, moment: &DateTime<Utc>) -> u64 {
    let key = format!(
        "{}|{:.5}|{:.5}|{}",
        name.trim().to_lowercase(),
        latitude,
        longitude,
        iso_instant::format(moment)
    );
    fnv1a(key.as_bytes())
}

/// Linear congruential step; returns a value in [0, 1).
fn next_unit(state: &mut u64) -> f64 {
    *state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    ((*state >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Ecliptic longitude of the ascendant in degrees.
pub fn ascendant_deg(moment: &DateTime<Utc>, latitude: f64, longitude: f64) -> f64 {
    let ramc = sidereal_time(days_since_j2000(moment), (-longitude).to_radians());
    let phi = latitude.clamp(-89.9, 89.9).to_radians();
    let asc = ramc
        .cos()
        .atan2(-(ramc.sin() * OBLIQUITY.cos() + phi.tan() * OBLIQUITY.sin()));
    normalize_deg(asc.to_degrees())
}

pub fn sign_of(longitude: f64) -> &'static str {
    let index = (normalize_deg(longitude) / 30.0).floor() as usize;
    ZODIAC_SIGNS[index % ZODIAC_SIGNS.len()]
}

fn degree_in_sign(longitude: f64) -> f64 {
    round_to(normalize_deg(longitude) % 30.0, 1)
}

/// Equal-house number (1..=12) of a longitude.
pub fn house_of(longitude: f64, ascendant: f64) -> u8 {
    let offset = normalize_deg(longitude - ascendant);
    ((offset / 30.0).floor() as u8).min(11) + 1
}

fn point(longitude: f64, ascendant: f64) -> ChartPoint {
    ChartPoint {
        sign: sign_of(longitude).to_string(),
        degree: Some(degree_in_sign(longitude)),
        house: Some(house_of(longitude, ascendant)),
    }
}

fn placement(body: &str, longitude: f64, ascendant: f64) -> PlanetPlacement {
    PlanetPlacement {
        body: body.to_string(),
        sign: sign_of(longitude).to_string(),
        degree: Some(degree_in_sign(longitude)),
        house: Some(house_of(longitude, ascendant)),
    }
}

/// Builds the mock chart for a resolved birth. Same inputs, same chart.
pub fn mock_chart(name: &str, place: &GeoPlace, moment: &DateTime<Utc>) -> NatalChart {
    let name = match name.trim() {
        "" => DEFAULT_NAME,
        n => n,
    };

    let sun = sun_longitude_deg(moment);
    let moon = moon_longitude_deg(moment);
    let ascendant = ascendant_deg(moment, place.latitude, place.longitude);

    let mut state = chart_seed(name, place.latitude, place.longitude, moment);
    let mut planets = vec![
        placement("Sun", sun, ascendant),
        placement("Moon", moon, ascendant),
    ];
    for (body, elongation) in SEEDED_BODIES {
        let r = next_unit(&mut state);
        let longitude = match elongation {
            Some(max) => sun + (r * 2.0 - 1.0) * max,
            None => r * 360.0,
        };
        planets.push(placement(body, longitude, ascendant));
    }

    let houses = (0..12u8)
        .map(|i| HouseCusp {
            house: i + 1,
            cusp: round_to(normalize_deg(ascendant + 30.0 * f64::from(i)), 2),
        })
        .collect();

    NatalChart {
        source: ChartSource::Mock,
        name: name.to_string(),
        location: ChartLocation {
            lat: place.latitude,
            lon: place.longitude,
            city: place.name.clone(),
            country: place.country.clone(),
        },
        moment_utc: *moment,
        system: MOCK_SYSTEM.to_string(),
        summary: ChartSummary {
            sun: point(sun, ascendant),
            moon: point(moon, ascendant),
            rising: ChartPoint {
                sign: sign_of(ascendant).to_string(),
                degree: Some(degree_in_sign(ascendant)),
                house: Some(1),
            },
        },
        planets,
        houses,
        notes: Some(MOCK_NOTES.to_string()),
    }
}
