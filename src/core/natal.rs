//! Birthplace + local time + name → UTC birth moment → natal chart.

use crate::adapters::chart_api::{ChartAuth, HttpChartProvider};
use crate::adapters::http::build_client;
use crate::adapters::open_meteo::{OpenMeteoGeocoder, OpenMeteoTimezone};
use crate::config::toml_config::AppConfig;
use crate::config::SourceStrategy;
use crate::core::mock_chart::{mock_chart, DEFAULT_NAME};
use crate::core::moment::{local_to_utc, normalize_date, normalize_time};
use crate::domain::model::{
    BirthMoment, ChartLocation, ChartRequest, ChartSource, NatalChart, ProviderChart,
};
use crate::domain::ports::{ChartProvider, GeoLookup, TimezoneLookup};
use crate::utils::error::Result;
use std::fmt;

pub const DEFAULT_SYSTEM: &str = "Tropical / Placidus";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Idle,
    Geocoding,
    ResolvingTimezone,
    ResolvingMoment,
    ResolvingChart,
    Complete,
    Failed,
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Geocoding => "geocoding",
            Self::ResolvingTimezone => "resolving timezone",
            Self::ResolvingMoment => "resolving moment",
            Self::ResolvingChart => "resolving chart",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

fn advance(stage: &mut ResolutionStage, next: ResolutionStage) {
    tracing::debug!("Natal resolution: {} -> {}", stage, next);
    *stage = next;
}

pub struct NatalChartResolver<G, T, C>
where
    G: GeoLookup,
    T: TimezoneLookup,
    C: ChartProvider,
{
    geo: G,
    timezone: T,
    chart: Option<C>,
    strategy: SourceStrategy,
}

impl NatalChartResolver<OpenMeteoGeocoder, OpenMeteoTimezone, HttpChartProvider> {
    /// Wires the Open-Meteo resolvers and, when an endpoint is configured,
    /// the HTTP chart provider.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_client(&config.http)?;
        let geo = OpenMeteoGeocoder::new(client.clone(), config.geocoding.endpoint.clone());
        let timezone = OpenMeteoTimezone::new(client.clone(), config.timezone.endpoint.clone());
        let chart = config.chart.endpoint.as_ref().map(|endpoint| {
            let auth = ChartAuth::from_credentials(
                config.chart.api_key.as_deref(),
                config.chart.api_secret.as_deref(),
            );
            HttpChartProvider::new(client.clone(), endpoint.clone(), auth)
        });
        Ok(Self::new(geo, timezone, chart, config.chart.strategy))
    }
}

impl<G, T, C> NatalChartResolver<G, T, C>
where
    G: GeoLookup,
    T: TimezoneLookup,
    C: ChartProvider,
{
    pub fn new(geo: G, timezone: T, chart: Option<C>, strategy: SourceStrategy) -> Self {
        Self {
            geo,
            timezone,
            chart,
            strategy,
        }
    }

    /// Resolves the birth moment only; no chart request is made.
    pub async fn resolve_birth_moment(
        &self,
        date: &str,
        time: Option<&str>,
        city: &str,
    ) -> Result<BirthMoment> {
        let mut stage = ResolutionStage::Idle;
        let result = self.birth_moment(&mut stage, date, time, city).await;
        if result.is_err() {
            advance(&mut stage, ResolutionStage::Failed);
        }
        result
    }

    pub async fn calculate(
        &self,
        name: &str,
        date: &str,
        time: Option<&str>,
        city: &str,
    ) -> Result<NatalChart> {
        let mut stage = ResolutionStage::Idle;
        let moment = match self.birth_moment(&mut stage, date, time, city).await {
            Ok(moment) => moment,
            Err(e) => {
                tracing::warn!("Natal chart resolution failed while {}: {}", stage, e);
                advance(&mut stage, ResolutionStage::Failed);
                return Err(e);
            }
        };

        advance(&mut stage, ResolutionStage::ResolvingChart);
        let chart = match self.chart_for(name, &moment).await {
            Ok(chart) => chart,
            Err(e) => {
                tracing::warn!("Natal chart resolution failed while {}: {}", stage, e);
                advance(&mut stage, ResolutionStage::Failed);
                return Err(e);
            }
        };
        advance(&mut stage, ResolutionStage::Complete);

        tracing::info!(
            "Natal chart for {}, {} at {} resolved from {:?}",
            moment.place.name,
            moment.place.country,
            chart.moment_utc,
            chart.source
        );
        Ok(chart)
    }

    async fn birth_moment(
        &self,
        stage: &mut ResolutionStage,
        date: &str,
        time: Option<&str>,
        city: &str,
    ) -> Result<BirthMoment> {
        // Bad input is rejected before anything goes over the network.
        let local_date = normalize_date(date)?;
        let local_time = normalize_time(time)?;
        let local = local_date.and_time(local_time);

        advance(stage, ResolutionStage::Geocoding);
        let place = self.geo.resolve(city).await?;

        advance(stage, ResolutionStage::ResolvingTimezone);
        let timezone = self
            .timezone
            .resolve(place.latitude, place.longitude, local)
            .await?;

        advance(stage, ResolutionStage::ResolvingMoment);
        let instant = local_to_utc(local, timezone.utc_offset_seconds);

        Ok(BirthMoment {
            place,
            timezone,
            local_date,
            local_time,
            instant,
        })
    }

    /// An unreachable provider or an unreadable payload degrades to the mock
    /// chart; any other provider error is returned.
    async fn chart_for(&self, name: &str, moment: &BirthMoment) -> Result<NatalChart> {
        let provider = match (self.strategy, &self.chart) {
            (SourceStrategy::Remote, Some(provider)) => provider,
            _ => {
                tracing::debug!("No chart provider in use, generating mock chart");
                return Ok(mock_chart(name, &moment.place, &moment.instant));
            }
        };

        let request = ChartRequest {
            name: name.trim().to_string(),
            date: moment.local_date.format("%Y-%m-%d").to_string(),
            time: moment.local_time.format("%H:%M").to_string(),
            latitude: moment.place.latitude,
            longitude: moment.place.longitude,
            timezone: moment.timezone.timezone.clone(),
        };

        match provider.fetch_chart(&request).await {
            Ok(chart) => Ok(from_provider(name, moment, chart)),
            Err(e) if e.is_fallback_eligible() => {
                tracing::warn!("Chart provider failed, falling back to mock chart: {}", e);
                Ok(mock_chart(name, &moment.place, &moment.instant))
            }
            Err(e) => Err(e),
        }
    }
}

fn from_provider(name: &str, moment: &BirthMoment, chart: ProviderChart) -> NatalChart {
    let place = &moment.place;
    let name = Some(name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or(chart.name)
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    NatalChart {
        source: ChartSource::Api,
        name,
        location: ChartLocation {
            lat: place.latitude,
            lon: place.longitude,
            city: place.name.clone(),
            country: place.country.clone(),
        },
        moment_utc: moment.instant,
        system: chart.system.unwrap_or_else(|| DEFAULT_SYSTEM.to_string()),
        summary: chart.summary,
        planets: chart.planets,
        houses: chart.houses,
        notes: None,
    }
}
