use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Sign label used wherever a placement is unknown.
pub const UNKNOWN_SIGN: &str = "—";

/// UTC instants serialize as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub mod iso_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn format(instant: &DateTime<Utc>) -> String {
        instant.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            instant: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match instant {
                Some(instant) => serializer.serialize_str(&super::format(instant)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

/// Where a month of lunar data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarSource {
    #[serde(rename = "open-meteo")]
    Remote,
    #[serde(rename = "local-fallback")]
    LocalFallback,
    #[serde(rename = "local")]
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub weekday: String,
    pub phase: String,
    #[serde(rename = "phaseId")]
    pub phase_slug: String,
    pub illumination: u8,
    #[serde(rename = "age")]
    pub moon_age: f64,
    pub distance_km: Option<u64>,
    #[serde(rename = "rise", with = "iso_instant::option")]
    pub moonrise: Option<DateTime<Utc>>,
    #[serde(rename = "set", with = "iso_instant::option")]
    pub moonset: Option<DateTime<Utc>>,
    #[serde(with = "iso_instant::option")]
    pub sunrise: Option<DateTime<Utc>>,
    #[serde(with = "iso_instant::option")]
    pub sunset: Option<DateTime<Utc>>,
    pub altitude: Option<f64>,
    pub azimuth: Option<f64>,
    pub sign: String,
    pub rituals: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub source: CalendarSource,
    /// 1-based calendar month.
    pub month: u32,
    pub year: i32,
    pub days: Vec<DayRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneInfo {
    pub timezone: String,
    pub utc_offset_seconds: i32,
    /// Local wall-clock instant the offset was resolved against.
    pub resolved_for: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthMoment {
    pub place: GeoPlace,
    pub timezone: TimezoneInfo,
    pub local_date: NaiveDate,
    pub local_time: NaiveTime,
    #[serde(with = "iso_instant")]
    pub instant: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSource {
    Api,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLocation {
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub sign: String,
    pub degree: Option<f64>,
    pub house: Option<u8>,
}

impl ChartPoint {
    pub fn unknown() -> Self {
        Self {
            sign: UNKNOWN_SIGN.to_string(),
            degree: None,
            house: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub sun: ChartPoint,
    pub moon: ChartPoint,
    pub rising: ChartPoint,
}

impl Default for ChartSummary {
    fn default() -> Self {
        Self {
            sun: ChartPoint::unknown(),
            moon: ChartPoint::unknown(),
            rising: ChartPoint::unknown(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPlacement {
    pub body: String,
    pub sign: String,
    pub degree: Option<f64>,
    pub house: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house: u8,
    pub cusp: f64,
}

/// Chart content as returned by a provider, already canonicalized: every
/// missing placement is an explicit unknown marker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderChart {
    pub name: Option<String>,
    pub system: Option<String>,
    pub summary: ChartSummary,
    pub planets: Vec<PlanetPlacement>,
    pub houses: Vec<HouseCusp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatalChart {
    pub source: ChartSource,
    pub name: String,
    pub location: ChartLocation,
    #[serde(rename = "momentUTC", with = "iso_instant")]
    pub moment_utc: DateTime<Utc>,
    pub system: String,
    pub summary: ChartSummary,
    pub planets: Vec<PlanetPlacement>,
    pub houses: Vec<HouseCusp>,
    pub notes: Option<String>,
}

/// Payload sent to a chart-generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub name: String,
    pub date: String,
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// One day of raw lunar/solar data from either source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySample {
    pub date: NaiveDate,
    /// Lunar cycle position in [0, 1).
    pub phase_fraction: f64,
    /// Illuminated share of the disc in [0, 100].
    pub illumination_percent: f64,
    pub moonrise: Option<DateTime<Utc>>,
    pub moonset: Option<DateTime<Utc>>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub position: Option<MoonPosition>,
}

/// Topocentric moon position; angles in radians, distance in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPosition {
    pub altitude: f64,
    pub azimuth: f64,
    pub distance_km: f64,
}
