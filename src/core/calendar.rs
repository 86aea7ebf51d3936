//! Source-independent normalization of a day's lunar data into a [`DayRecord`].

use crate::domain::model::{DayRecord, DaySample};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mean length of the lunar phase cycle, days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

pub const ZODIAC_SIGNS: [&str; 12] = [
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Maps a phase fraction onto the eight named phases. Values outside
    /// [0, 1) wrap around the cycle; non-finite values count as new moon.
    pub fn from_fraction(fraction: f64) -> Self {
        let p = cycle_position(fraction);

        if p < 0.03 || p > 0.97 {
            Self::NewMoon
        } else if p < 0.22 {
            Self::WaxingCrescent
        } else if p < 0.28 {
            Self::FirstQuarter
        } else if p < 0.47 {
            Self::WaxingGibbous
        } else if p < 0.53 {
            Self::FullMoon
        } else if p < 0.72 {
            Self::WaningGibbous
        } else if p < 0.78 {
            Self::LastQuarter
        } else {
            Self::WaningCrescent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NewMoon => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::FullMoon => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn slug(&self) -> String {
        slugify(self.label())
    }
}

pub fn phase_name(fraction: f64) -> &'static str {
    MoonPhase::from_fraction(fraction).label()
}

/// Lowercase, with each whitespace run replaced by an underscore.
pub fn slugify(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Wraps a phase fraction into `[0, 1)`; non-finite input counts as new moon.
pub fn cycle_position(fraction: f64) -> f64 {
    if fraction.is_finite() {
        fraction.rem_euclid(1.0)
    } else {
        0.0
    }
}

/// Approximate days since new moon, to one decimal.
pub fn moon_age(fraction: f64) -> f64 {
    round_to(fraction * SYNODIC_MONTH_DAYS, 1)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Radians to degrees, two decimals; `None` for missing or non-finite input.
pub fn angle_degrees(radians: Option<f64>) -> Option<f64> {
    radians
        .filter(|r| r.is_finite())
        .map(|r| round_to(r.to_degrees(), 2))
}

pub fn distance_km(distance: Option<f64>) -> Option<u64> {
    distance
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.round() as u64)
}

/// Placeholder sign: cycles through the zodiac by day index, not by the
/// Moon's ecliptic longitude.
pub fn placeholder_sign(day_index: usize) -> &'static str {
    ZODIAC_SIGNS[day_index % ZODIAC_SIGNS.len()]
}

pub fn rituals_for(phase_slug: &str) -> Vec<String> {
    let rituals: &[&str] = match phase_slug {
        "new_moon" => &["Set intentions", "Make moon water"],
        "waxing_crescent" => &["Take small steps", "Light a candle for new beginnings"],
        "first_quarter" => &["Take action", "Do a focus ritual"],
        "waxing_gibbous" => &["Refine your work", "Express gratitude"],
        "full_moon" => &["Release & celebrate", "Do a moon bath"],
        "waning_gibbous" => &["Reflect & share wisdom"],
        "last_quarter" => &["Let go & declutter", "Forgiveness meditation"],
        "waning_crescent" => &["Rest & restore", "Dream journaling"],
        _ => &["Journal & breathe"],
    };
    rituals.iter().map(|r| r.to_string()).collect()
}

pub fn recommendation(phase_label: &str, illumination: u8) -> String {
    format!("{} · {}% illuminated", phase_label, illumination)
}

pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

pub fn illumination_percent(percent: f64) -> u8 {
    if percent.is_finite() {
        percent.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Builds the canonical record for the `day_index`-th day of a month.
pub fn normalize_day(day_index: usize, sample: &DaySample) -> DayRecord {
    let phase = MoonPhase::from_fraction(sample.phase_fraction);
    let phase_slug = phase.slug();
    let illumination = illumination_percent(sample.illumination_percent);
    let fraction = cycle_position(sample.phase_fraction);

    DayRecord {
        date: sample.date,
        weekday: weekday_label(sample.date),
        phase: phase.label().to_string(),
        rituals: rituals_for(&phase_slug),
        phase_slug,
        illumination,
        moon_age: moon_age(fraction),
        distance_km: distance_km(sample.position.map(|p| p.distance_km)),
        moonrise: sample.moonrise,
        moonset: sample.moonset,
        sunrise: sample.sunrise,
        sunset: sample.sunset,
        altitude: angle_degrees(sample.position.map(|p| p.altitude)),
        azimuth: angle_degrees(sample.position.map(|p| p.azimuth)),
        sign: placeholder_sign(day_index).to_string(),
        recommendation: recommendation(phase.label(), illumination),
    }
}

/// Number of days in a 1-based calendar month; `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Every date of a 1-based calendar month, in order.
pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let (Some(first), Some(days)) = (NaiveDate::from_ymd_opt(year, month, 1), days_in_month(year, month)) else {
        return Vec::new();
    };
    first.iter_days().take(days as usize).collect()
}
