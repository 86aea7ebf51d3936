use crate::domain::model::{ChartRequest, DaySample, GeoPlace, ProviderChart, TimezoneInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Best single match for a free-text place name, or `NotFound`.
    async fn resolve(&self, place_name: &str) -> Result<GeoPlace>;
}

#[async_trait]
pub trait TimezoneLookup: Send + Sync {
    /// Offset in force at `local` for the given coordinates.
    async fn resolve(&self, latitude: f64, longitude: f64, local: NaiveDateTime) -> Result<TimezoneInfo>;
}

#[async_trait]
pub trait EphemerisRangeSource: Send + Sync {
    /// One sample per day for the inclusive range `start..=end`.
    async fn fetch_range(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DaySample>>;
}

#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn fetch_chart(&self, request: &ChartRequest) -> Result<ProviderChart>;
}
