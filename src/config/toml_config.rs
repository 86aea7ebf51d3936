use crate::config::SourceStrategy;
use crate::utils::error::{CelestiaError, Result};
use crate::utils::validation::{validate_coordinates, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_TIMEZONE_ENDPOINT: &str = "https://api.open-meteo.com/v1/timezone";
pub const DEFAULT_EPHEMERIS_ENDPOINT: &str = "https://api.open-meteo.com/v1/astronomy";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub geocoding: EndpointConfig,
    pub timezone: EndpointConfig,
    pub ephemeris: EphemerisConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: format!("celestia-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A single remote endpoint; blank means the section's built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisConfig {
    pub endpoint: String,
    pub strategy: SourceStrategy,
    pub default_latitude: f64,
    pub default_longitude: f64,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EPHEMERIS_ENDPOINT.to_string(),
            strategy: SourceStrategy::Remote,
            default_latitude: 55.68,
            default_longitude: 12.57,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub strategy: SourceStrategy,
}

impl AppConfig {
    /// Loads a TOML file, substituting `${VAR}` references from the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CelestiaError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| CelestiaError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.fill_endpoint_defaults();
        Ok(config)
    }

    /// Unset variables are left as written so validation can report them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CelestiaError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn fill_endpoint_defaults(&mut self) {
        if self.geocoding.endpoint.trim().is_empty() {
            self.geocoding.endpoint = DEFAULT_GEOCODING_ENDPOINT.to_string();
        }
        if self.timezone.endpoint.trim().is_empty() {
            self.timezone.endpoint = DEFAULT_TIMEZONE_ENDPOINT.to_string();
        }
        if self.ephemeris.endpoint.trim().is_empty() {
            self.ephemeris.endpoint = DEFAULT_EPHEMERIS_ENDPOINT.to_string();
        }
        if let Some(endpoint) = &self.chart.endpoint {
            if endpoint.trim().is_empty() {
                self.chart.endpoint = None;
            }
        }
    }

    /// Built-in defaults: Open-Meteo endpoints, no chart endpoint.
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.fill_endpoint_defaults();
        config
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 300)?;
        validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validate_url("timezone.endpoint", &self.timezone.endpoint)?;
        validate_url("ephemeris.endpoint", &self.ephemeris.endpoint)?;
        validate_coordinates(
            "ephemeris.default_",
            self.ephemeris.default_latitude,
            self.ephemeris.default_longitude,
        )?;
        if let Some(endpoint) = &self.chart.endpoint {
            validate_url("chart.endpoint", endpoint)?;
        }
        if self.chart.api_secret.is_some() && self.chart.api_key.is_none() {
            return Err(CelestiaError::MissingConfigError {
                field: "chart.api_key".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.geocoding.endpoint, DEFAULT_GEOCODING_ENDPOINT);
        assert_eq!(config.timezone.endpoint, DEFAULT_TIMEZONE_ENDPOINT);
        assert_eq!(config.ephemeris.endpoint, DEFAULT_EPHEMERIS_ENDPOINT);
        assert_eq!(config.ephemeris.strategy, SourceStrategy::Remote);
        assert_eq!(config.ephemeris.default_latitude, 55.68);
        assert_eq!(config.http.timeout_seconds, 10);
        assert!(config.chart.endpoint.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config, AppConfig::with_defaults());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[http]
timeout_seconds = 5

[geocoding]
endpoint = "http://localhost:9000/v1/search"

[ephemeris]
strategy = "local"
default_latitude = 40.7128
default_longitude = -74.006

[chart]
endpoint = "https://astro.example.com/v1/natal"
api_key = "key"
api_secret = "secret"
strategy = "mock"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.geocoding.endpoint, "http://localhost:9000/v1/search");
        assert_eq!(config.timezone.endpoint, DEFAULT_TIMEZONE_ENDPOINT);
        assert_eq!(config.ephemeris.strategy, SourceStrategy::Local);
        assert_eq!(config.ephemeris.default_longitude, -74.006);
        assert_eq!(config.chart.strategy, SourceStrategy::Mock);
        assert_eq!(config.chart.api_secret.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CELESTIA_TEST_CHART_KEY", "from-env");

        let toml_content = r#"
[chart]
endpoint = "https://astro.example.com/v1/natal"
api_key = "${CELESTIA_TEST_CHART_KEY}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.chart.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("CELESTIA_TEST_CHART_KEY");
    }

    #[test]
    fn test_blank_chart_endpoint_means_none() {
        let config = AppConfig::from_toml_str("[chart]\nendpoint = \"\"\n").unwrap();
        assert!(config.chart.endpoint.is_none());
    }

    #[test]
    fn test_config_validation() {
        let bad_url = AppConfig::from_toml_str("[timezone]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_lat = AppConfig::from_toml_str("[ephemeris]\ndefault_latitude = 123.0\n").unwrap();
        assert!(bad_lat.validate().is_err());

        let secret_only = AppConfig::from_toml_str("[chart]\napi_secret = \"s\"\n").unwrap();
        assert!(matches!(
            secret_only.validate(),
            Err(CelestiaError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(AppConfig::from_toml_str("[ephemeris]\nstrategy = \"psychic\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[ephemeris]
strategy = "mock"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ephemeris.strategy, SourceStrategy::Mock);
    }
}
