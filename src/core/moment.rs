//! Local date/time parsing and conversion to an absolute UTC instant.

use crate::domain::model::iso_instant;
use crate::utils::error::{CelestiaError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Wall-clock time assumed when none is given.
pub const DEFAULT_TIME: &str = "12:00";

/// Parses `YYYY-MM-DD`, `DD.MM.YYYY`, `DD/MM/YYYY` and the other
/// combinations of `-`, `.` and `/` separators. The four-digit field
/// decides the order.
pub fn normalize_date(input: &str) -> Result<NaiveDate> {
    let parts: Vec<&str> = input
        .trim()
        .split(|c: char| c == '-' || c == '.' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let [first, second, third] = parts.as_slice() else {
        return Err(CelestiaError::invalid_input(
            "date",
            format!("expected three date components in '{}'", input),
        ));
    };

    let (year, month, day) = if first.len() == 4 {
        (*first, *second, *third)
    } else if third.len() == 4 {
        (*third, *second, *first)
    } else {
        return Err(CelestiaError::invalid_input(
            "date",
            format!("no four-digit year in '{}'", input),
        ));
    };

    let parse = |value: &str, what: &str| {
        value.parse::<u32>().map_err(|_| {
            CelestiaError::invalid_input("date", format!("invalid {} '{}' in '{}'", what, value, input))
        })
    };
    let year = parse(year, "year")? as i32;
    let month = parse(month, "month")?;
    let day = parse(day, "day")?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CelestiaError::invalid_input("date", format!("'{}' is not a calendar date", input))
    })
}

/// Accepts `HH:MM`, `HH.MM` or `HH:MM:SS`; empty input means noon.
pub fn normalize_time(input: Option<&str>) -> Result<NaiveTime> {
    let raw = match input.map(str::trim) {
        Some(t) if !t.is_empty() => t.replacen('.', ":", 1),
        _ => DEFAULT_TIME.to_string(),
    };

    NaiveTime::parse_from_str(&raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
        .map_err(|_| CelestiaError::invalid_input("time", format!("cannot parse '{}'", raw)))
}

/// Wall-clock time minus the zone's UTC offset.
pub fn local_to_utc(local: NaiveDateTime, utc_offset_seconds: i32) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(utc_offset_seconds))).and_utc()
}

pub fn to_utc(date: &str, time: Option<&str>, utc_offset_seconds: i32) -> Result<DateTime<Utc>> {
    let local = normalize_date(date)?.and_time(normalize_time(time)?);
    Ok(local_to_utc(local, utc_offset_seconds))
}

pub fn to_iso_string(instant: &DateTime<Utc>) -> String {
    iso_instant::format(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_utc_subtracts_offset() {
        let instant = to_utc("2025-06-01", Some("09:30"), 7200).unwrap();
        assert_eq!(to_iso_string(&instant), "2025-06-01T07:30:00.000Z");
    }

    #[test]
    fn test_to_utc_crosses_date_boundary() {
        let west = to_utc("2024-01-01", Some("20:00"), -5 * 3600).unwrap();
        assert_eq!(to_iso_string(&west), "2024-01-02T01:00:00.000Z");

        let east = to_utc("2024-01-01", Some("03:00"), 9 * 3600).unwrap();
        assert_eq!(to_iso_string(&east), "2023-12-31T18:00:00.000Z");
    }

    #[test]
    fn test_time_defaults_to_noon() {
        let instant = to_utc("2025-06-01", None, 0).unwrap();
        assert_eq!(to_iso_string(&instant), "2025-06-01T12:00:00.000Z");
        assert_eq!(normalize_time(Some("  ")).unwrap(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_time_separators() {
        let expected = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(normalize_time(Some("09:30")).unwrap(), expected);
        assert_eq!(normalize_time(Some("09.30")).unwrap(), expected);
        assert_eq!(normalize_time(Some("9:30")).unwrap(), expected);
        assert_eq!(
            normalize_time(Some("09:30:15")).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(normalize_time(Some("25:00")).is_err());
        assert!(normalize_time(Some("noon")).is_err());
    }

    #[test]
    fn test_date_separators() {
        let expected = NaiveDate::from_ymd_opt(1990, 8, 4).unwrap();
        for input in ["1990-08-04", "1990.08.04", "1990/08/04", "04.08.1990", "04/08/1990", "4-8-1990"] {
            assert_eq!(normalize_date(input).unwrap(), expected, "input {}", input);
        }
    }

    #[test]
    fn test_invalid_dates() {
        assert!(normalize_date("2023-02-29").is_err());
        assert!(normalize_date("2024-02").is_err());
        assert!(normalize_date("01.02.03").is_err());
        assert!(normalize_date("").is_err());
        assert!(matches!(
            normalize_date("yesterday"),
            Err(CelestiaError::InvalidInput { .. })
        ));
    }
}
