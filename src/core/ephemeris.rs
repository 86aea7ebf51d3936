//! Month-long lunar/solar calendar with remote-first, local-fallback sourcing.

use crate::adapters::http::build_client;
use crate::adapters::open_meteo::OpenMeteoAstronomy;
use crate::astro::moon::{moon_illumination, moon_position, moon_times};
use crate::astro::sun::sun_times;
use crate::config::toml_config::{AppConfig, EphemerisConfig};
use crate::config::SourceStrategy;
use crate::core::calendar::{month_dates, normalize_day};
use crate::domain::model::{CalendarSource, DaySample, MonthCalendar};
use crate::domain::ports::EphemerisRangeSource;
use crate::utils::error::{CelestiaError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Local samples are taken at 12:00 UTC so no timezone shifts them onto a neighbouring date.
fn utc_noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
        .and_utc()
}

/// One day of data from the local astronomical model.
pub fn local_sample(date: NaiveDate, latitude: f64, longitude: f64) -> DaySample {
    let noon = utc_noon(date);
    let illumination = moon_illumination(&noon);
    let moon = moon_times(date, latitude, longitude);
    let sun = sun_times(&noon, latitude, longitude);

    DaySample {
        date,
        phase_fraction: illumination.phase,
        illumination_percent: illumination.fraction * 100.0,
        moonrise: moon.rise,
        moonset: moon.set,
        sunrise: sun.sunrise,
        sunset: sun.sunset,
        position: Some(moon_position(&noon, latitude, longitude)),
    }
}

pub fn local_samples(dates: &[NaiveDate], latitude: f64, longitude: f64) -> Vec<DaySample> {
    dates
        .iter()
        .map(|date| local_sample(*date, latitude, longitude))
        .collect()
}

pub struct EphemerisAggregator<R: EphemerisRangeSource> {
    remote: R,
    config: EphemerisConfig,
}

impl EphemerisAggregator<OpenMeteoAstronomy> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_client(&config.http)?;
        let remote = OpenMeteoAstronomy::new(client, config.ephemeris.endpoint.clone());
        Ok(Self::new(remote, config.ephemeris.clone()))
    }
}

impl<R: EphemerisRangeSource> EphemerisAggregator<R> {
    pub fn new(remote: R, config: EphemerisConfig) -> Self {
        Self { remote, config }
    }

    /// `month_index` is zero-based (0 = January).
    pub async fn fetch_month(
        &self,
        year: i32,
        month_index: u32,
        latitude: f64,
        longitude: f64,
    ) -> Result<MonthCalendar> {
        if month_index > 11 {
            return Err(CelestiaError::invalid_input(
                "month",
                format!("month index {} is outside 0..=11", month_index),
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CelestiaError::invalid_input(
                "coordinates",
                format!("({}, {}) is not a valid latitude/longitude", latitude, longitude),
            ));
        }

        let month = month_index + 1;
        let dates = month_dates(year, month);
        let (Some(start), Some(end)) = (dates.first().copied(), dates.last().copied()) else {
            return Err(CelestiaError::invalid_input(
                "year",
                format!("{} is outside the supported calendar range", year),
            ));
        };

        let (source, samples) = match self.config.strategy {
            SourceStrategy::Remote => {
                match self.remote.fetch_range(latitude, longitude, start, end).await {
                    Ok(samples) => (
                        CalendarSource::Remote,
                        with_local_positions(samples, latitude, longitude),
                    ),
                    Err(e) if e.is_fallback_eligible() => {
                        tracing::warn!(
                            "Remote ephemeris unavailable for {}-{:02}, falling back to local computation: {}",
                            year,
                            month,
                            e
                        );
                        (
                            CalendarSource::LocalFallback,
                            local_samples(&dates, latitude, longitude),
                        )
                    }
                    Err(e) => {
                        tracing::error!("Remote ephemeris rejected {}-{:02}: {}", year, month, e);
                        return Err(e);
                    }
                }
            }
            SourceStrategy::Local | SourceStrategy::Mock => {
                (CalendarSource::Local, local_samples(&dates, latitude, longitude))
            }
        };

        let days = samples
            .iter()
            .enumerate()
            .map(|(i, sample)| normalize_day(i, sample))
            .collect::<Vec<_>>();

        tracing::info!(
            "Resolved {} days for {}-{:02} from {:?}",
            days.len(),
            year,
            month,
            source
        );

        Ok(MonthCalendar {
            source,
            month,
            year,
            days,
        })
    }

    /// Same as [`fetch_month`](Self::fetch_month) at the configured default observer.
    pub async fn fetch_month_at_default(&self, year: i32, month_index: u32) -> Result<MonthCalendar> {
        self.fetch_month(
            year,
            month_index,
            self.config.default_latitude,
            self.config.default_longitude,
        )
        .await
    }
}

/// The remote series has no topocentric position; it comes from the local model at UTC noon.
fn with_local_positions(samples: Vec<DaySample>, latitude: f64, longitude: f64) -> Vec<DaySample> {
    samples
        .into_iter()
        .map(|mut sample| {
            if sample.position.is_none() {
                sample.position = Some(moon_position(&utc_noon(sample.date), latitude, longitude));
            }
            sample
        })
        .collect()
}
