use crate::domain::model::{iso_instant, MonthCalendar};
use crate::utils::error::{CelestiaError, Result};
use serde::Serialize;

/// Flat CSV row for one day; optional values become empty cells.
#[derive(Debug, Serialize)]
struct DayRow<'a> {
    date: String,
    weekday: &'a str,
    phase: &'a str,
    phase_id: &'a str,
    illumination: u8,
    age: f64,
    distance_km: Option<u64>,
    moonrise: Option<String>,
    moonset: Option<String>,
    sunrise: Option<String>,
    sunset: Option<String>,
    altitude: Option<f64>,
    azimuth: Option<f64>,
    sign: &'a str,
    rituals: String,
    recommendation: &'a str,
    source: String,
}

pub fn month_to_json(calendar: &MonthCalendar) -> Result<String> {
    Ok(serde_json::to_string_pretty(calendar)?)
}

pub fn month_to_csv(calendar: &MonthCalendar) -> Result<String> {
    let source = serde_json::to_value(calendar.source)?
        .as_str()
        .unwrap_or_default()
        .to_string();

    let mut writer = csv::Writer::from_writer(Vec::new());
    for day in &calendar.days {
        writer.serialize(DayRow {
            date: day.date.format("%Y-%m-%d").to_string(),
            weekday: &day.weekday,
            phase: &day.phase,
            phase_id: &day.phase_slug,
            illumination: day.illumination,
            age: day.moon_age,
            distance_km: day.distance_km,
            moonrise: day.moonrise.as_ref().map(iso_instant::format),
            moonset: day.moonset.as_ref().map(iso_instant::format),
            sunrise: day.sunrise.as_ref().map(iso_instant::format),
            sunset: day.sunset.as_ref().map(iso_instant::format),
            altitude: day.altitude,
            azimuth: day.azimuth,
            sign: &day.sign,
            rituals: day.rituals.join("; "),
            recommendation: &day.recommendation,
            source: source.clone(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CelestiaError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| CelestiaError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::normalize_day;
    use crate::domain::model::{CalendarSource, DaySample};
    use chrono::NaiveDate;

    fn calendar() -> MonthCalendar {
        let sample = DaySample {
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            phase_fraction: 0.5,
            illumination_percent: 99.6,
            moonrise: None,
            moonset: None,
            sunrise: Some(
                NaiveDate::from_ymd_opt(2024, 2, 24)
                    .unwrap()
                    .and_hms_opt(6, 12, 0)
                    .unwrap()
                    .and_utc(),
            ),
            sunset: None,
            position: None,
        };
        MonthCalendar {
            source: CalendarSource::LocalFallback,
            month: 2,
            year: 2024,
            days: vec![normalize_day(23, &sample)],
        }
    }

    #[test]
    fn test_csv_has_header_and_joined_rituals() {
        let csv = month_to_csv(&calendar()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,weekday,phase,phase_id,illumination,age,distance_km,moonrise,moonset,sunrise,sunset,altitude,azimuth,sign,rituals,recommendation,source"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-02-24,Sat,Full Moon,full_moon,100,14.8,,,,2024-02-24T06:12:00.000Z,,,,Pisces,"));
        assert!(row.contains("Release & celebrate; Do a moon bath"));
        assert!(row.ends_with(",local-fallback"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_json_uses_wire_names() {
        let json = month_to_json(&calendar()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "local-fallback");
        let day = &value["days"][0];
        assert_eq!(day["phaseId"], "full_moon");
        assert_eq!(day["age"], 14.8);
        assert!(day["rise"].is_null());
        assert_eq!(day["sunrise"], "2024-02-24T06:12:00.000Z");
        assert!(day["distanceKm"].is_null());
    }
}
