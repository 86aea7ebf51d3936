//! Client for an external natal-chart generation endpoint.

use crate::adapters::http::{classify, ensure_success, read_json};
use crate::domain::model::{
    ChartPoint, ChartRequest, ChartSummary, HouseCusp, PlanetPlacement, ProviderChart,
    UNKNOWN_SIGN,
};
use crate::domain::ports::ChartProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, Request, RequestBuilder};
use serde::{Deserialize, Deserializer};

const CHART: &str = "chart";

pub const API_KEY_HEADER: &str = "x-api-key";

/// Credentials attached to chart requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartAuth {
    None,
    ApiKey(String),
    Basic { key: String, secret: String },
}

impl ChartAuth {
    /// Key and secret give basic auth, a key alone gives the key header.
    /// Empty strings count as absent.
    pub fn from_credentials(key: Option<&str>, secret: Option<&str>) -> Self {
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        let secret = secret.map(str::trim).filter(|s| !s.is_empty());
        match (key, secret) {
            (Some(key), Some(secret)) => Self::Basic {
                key: key.to_string(),
                secret: secret.to_string(),
            },
            (Some(key), None) => Self::ApiKey(key.to_string()),
            _ => Self::None,
        }
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::ApiKey(key) => builder.header(API_KEY_HEADER, key),
            Self::Basic { key, secret } => builder.basic_auth(key, Some(secret)),
        }
    }
}

/// Numeric provider fields sometimes arrive quoted.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn loose_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<LooseNumber>::deserialize(deserializer)? {
        Some(LooseNumber::Number(n)) => Some(n),
        Some(LooseNumber::Text(text)) => text.trim().parse::<f64>().ok(),
        Some(LooseNumber::Other(_)) | None => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

fn loose_house<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_f64(deserializer)?
        .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(n))
        .map(|n| n as u8))
}

#[derive(Debug, Default, Deserialize)]
struct RawPoint {
    sign: Option<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    degree: Option<f64>,
    #[serde(default, deserialize_with = "loose_house")]
    house: Option<u8>,
}

impl RawPoint {
    fn canonicalize(self) -> ChartPoint {
        ChartPoint {
            sign: self.sign.unwrap_or_else(|| UNKNOWN_SIGN.to_string()),
            degree: self.degree,
            house: self.house,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSummary {
    sun: Option<RawPoint>,
    moon: Option<RawPoint>,
    rising: Option<RawPoint>,
}

#[derive(Debug, Deserialize)]
struct RawPlanet {
    #[serde(alias = "name")]
    body: Option<String>,
    sign: Option<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    degree: Option<f64>,
    #[serde(default, deserialize_with = "loose_house")]
    house: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct RawHouse {
    #[serde(default, deserialize_with = "loose_house")]
    house: Option<u8>,
    #[serde(default, deserialize_with = "loose_f64")]
    cusp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawChartResponse {
    name: Option<String>,
    system: Option<String>,
    summary: Option<RawSummary>,
    sun: Option<RawPoint>,
    moon: Option<RawPoint>,
    ascendant: Option<RawPoint>,
    planets: Option<Vec<RawPlanet>>,
    houses: Option<Vec<RawHouse>>,
}

fn point(primary: Option<RawPoint>, secondary: Option<RawPoint>) -> ChartPoint {
    primary
        .or(secondary)
        .map(RawPoint::canonicalize)
        .unwrap_or_else(ChartPoint::unknown)
}

impl RawChartResponse {
    /// Summary points are read from `summary.*` first, then from the
    /// top-level `sun`/`moon`/`ascendant` keys some providers use.
    fn canonicalize(self) -> ProviderChart {
        let summary = self.summary.unwrap_or_default();
        let planets = self
            .planets
            .unwrap_or_default()
            .into_iter()
            .map(|p| PlanetPlacement {
                body: p.body.unwrap_or_else(|| UNKNOWN_SIGN.to_string()),
                sign: p.sign.unwrap_or_else(|| UNKNOWN_SIGN.to_string()),
                degree: p.degree,
                house: p.house,
            })
            .collect();
        let houses = self
            .houses
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let cusp = h.cusp?;
                Some(HouseCusp {
                    house: h.house.unwrap_or((i + 1) as u8),
                    cusp,
                })
            })
            .collect();

        ProviderChart {
            name: self.name.filter(|n| !n.trim().is_empty()),
            system: self.system.filter(|s| !s.trim().is_empty()),
            summary: ChartSummary {
                sun: point(summary.sun, self.sun),
                moon: point(summary.moon, self.moon),
                rising: point(summary.rising, self.ascendant),
            },
            planets,
            houses,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpChartProvider {
    client: Client,
    endpoint: String,
    auth: ChartAuth,
}

impl HttpChartProvider {
    pub fn new(client: Client, endpoint: impl Into<String>, auth: ChartAuth) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            auth,
        }
    }

    pub fn build_request(&self, request: &ChartRequest) -> Result<Request> {
        let builder = self.client.post(&self.endpoint).json(request);
        self.auth
            .apply(builder)
            .build()
            .map_err(|e| classify(CHART, e))
    }
}

#[async_trait]
impl ChartProvider for HttpChartProvider {
    async fn fetch_chart(&self, request: &ChartRequest) -> Result<ProviderChart> {
        tracing::debug!("Requesting chart for '{}' via {}", request.name, self.endpoint);
        let http_request = self.build_request(request)?;
        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(|e| classify(CHART, e))?;
        let response = ensure_success(CHART, response).await?;
        let payload: RawChartResponse = read_json(CHART, response).await?;
        Ok(payload.canonicalize())
    }
}
