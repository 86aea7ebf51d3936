//! Open-Meteo geocoding, timezone and astronomy clients.
//!
//! Each client canonicalizes its payload before returning: missing optional
//! sub-fields get explicit defaults here, so nothing downstream handles
//! partially-shaped data.

use crate::adapters::http::{classify, ensure_success, read_json};
use crate::core::moment::local_to_utc;
use crate::domain::model::{DaySample, GeoPlace, TimezoneInfo};
use crate::domain::ports::{EphemerisRangeSource, GeoLookup, TimezoneLookup};
use crate::utils::error::{CelestiaError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

const GEOCODING: &str = "geocoding";
const TIMEZONE: &str = "timezone";
const EPHEMERIS: &str = "ephemeris";

const DAILY_FIELDS: &str = "sunrise,sunset,moonrise,moonset,moon_phase,moon_illumination";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingHit>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingHit {
    name: Option<String>,
    country: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    endpoint: String,
}

impl OpenMeteoGeocoder {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl GeoLookup for OpenMeteoGeocoder {
    async fn resolve(&self, place_name: &str) -> Result<GeoPlace> {
        tracing::debug!("Geocoding '{}' via {}", place_name, self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("count", "1"), ("name", place_name)])
            .send()
            .await
            .map_err(|e| classify(GEOCODING, e))?;
        let response = ensure_success(GEOCODING, response).await?;
        let payload: GeocodingResponse = read_json(GEOCODING, response).await?;

        // The provider orders by relevance; the first hit wins.
        let hit = payload
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| CelestiaError::NotFound {
                query: place_name.to_string(),
            })?;

        let (Some(latitude), Some(longitude)) = (hit.latitude, hit.longitude) else {
            return Err(CelestiaError::malformed(
                GEOCODING,
                format!("match for '{}' has no coordinates", place_name),
            ));
        };

        Ok(GeoPlace {
            name: hit.name.unwrap_or_else(|| place_name.to_string()),
            country: hit.country.unwrap_or_default(),
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    timezone: Option<String>,
    utc_offset_seconds: Option<i32>,
}

/// `UTC+02:00` style label for a fixed offset.
pub fn offset_label(utc_offset_seconds: i32) -> String {
    let sign = if utc_offset_seconds < 0 { '-' } else { '+' };
    let total = utc_offset_seconds.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, total / 3600, (total % 3600) / 60)
}

#[derive(Debug, Clone)]
pub struct OpenMeteoTimezone {
    client: Client,
    endpoint: String,
}

impl OpenMeteoTimezone {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TimezoneLookup for OpenMeteoTimezone {
    async fn resolve(&self, latitude: f64, longitude: f64, local: NaiveDateTime) -> Result<TimezoneInfo> {
        let date_time = local.format("%Y-%m-%dT%H:%M").to_string();
        tracing::debug!(
            "Resolving timezone for ({}, {}) at {} via {}",
            latitude,
            longitude,
            date_time,
            self.endpoint
        );
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("date_time", date_time),
            ])
            .send()
            .await
            .map_err(|e| classify(TIMEZONE, e))?;
        let response = ensure_success(TIMEZONE, response).await?;
        let payload: TimezoneResponse = read_json(TIMEZONE, response).await?;

        let utc_offset_seconds = payload
            .utc_offset_seconds
            .ok_or_else(|| CelestiaError::malformed(TIMEZONE, "missing utc_offset_seconds"))?;

        Ok(TimezoneInfo {
            timezone: payload
                .timezone
                .unwrap_or_else(|| offset_label(utc_offset_seconds)),
            utc_offset_seconds,
            resolved_for: local,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AstronomyResponse {
    utc_offset_seconds: Option<i32>,
    daily: Option<AstronomyDaily>,
}

#[derive(Debug, Deserialize)]
struct AstronomyDaily {
    time: Option<Vec<String>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
    #[serde(default)]
    moonrise: Vec<Option<String>>,
    #[serde(default)]
    moonset: Vec<Option<String>>,
    #[serde(default)]
    moon_phase: Vec<Option<f64>>,
    #[serde(default)]
    moon_illumination: Vec<Option<f64>>,
}

/// Parses an RFC 3339 instant, or a naive wall-clock time in the response's offset.
fn parse_remote_instant(raw: &str, utc_offset_seconds: i32) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|local| local_to_utc(local, utc_offset_seconds))
}

fn series_value<T: Clone>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).cloned().flatten()
}

impl AstronomyResponse {
    fn into_samples(self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DaySample>> {
        let offset = self.utc_offset_seconds.unwrap_or(0);
        let daily = self
            .daily
            .ok_or_else(|| CelestiaError::malformed(EPHEMERIS, "missing daily block"))?;
        let times = daily
            .time
            .as_ref()
            .ok_or_else(|| CelestiaError::malformed(EPHEMERIS, "missing daily.time"))?;

        let expected: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        if times.len() != expected.len() {
            return Err(CelestiaError::malformed(
                EPHEMERIS,
                format!("expected {} days, got {}", expected.len(), times.len()),
            ));
        }

        let instant = |series: &[Option<String>], i: usize| {
            series_value(series, i).and_then(|raw| parse_remote_instant(&raw, offset))
        };

        times
            .iter()
            .zip(expected)
            .enumerate()
            .map(|(i, (raw_date, expected_date))| {
                let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
                    CelestiaError::malformed(EPHEMERIS, format!("invalid date '{}'", raw_date))
                })?;
                if date != expected_date {
                    return Err(CelestiaError::malformed(
                        EPHEMERIS,
                        format!("day {} is {}, expected {}", i, date, expected_date),
                    ));
                }

                Ok(DaySample {
                    date,
                    phase_fraction: series_value(&daily.moon_phase, i).unwrap_or(0.0),
                    illumination_percent: series_value(&daily.moon_illumination, i).unwrap_or(0.0),
                    moonrise: instant(&daily.moonrise, i),
                    moonset: instant(&daily.moonset, i),
                    sunrise: instant(&daily.sunrise, i),
                    sunset: instant(&daily.sunset, i),
                    position: None,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoAstronomy {
    client: Client,
    endpoint: String,
}

impl OpenMeteoAstronomy {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EphemerisRangeSource for OpenMeteoAstronomy {
    async fn fetch_range(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DaySample>> {
        tracing::debug!(
            "Requesting ephemeris {}..{} for ({}, {}) via {}",
            start,
            end,
            latitude,
            longitude,
            self.endpoint
        );
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("timezone", "GMT".to_string()),
                ("daily", DAILY_FIELDS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| classify(EPHEMERIS, e))?;
        let response = ensure_success(EPHEMERIS, response).await?;
        let payload: AstronomyResponse = read_json(EPHEMERIS, response).await?;
        payload.into_samples(start, end)
    }
}
