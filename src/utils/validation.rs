use crate::utils::error::{CelestiaError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CelestiaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CelestiaError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CelestiaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CelestiaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Latitude in [-90, 90] and longitude in [-180, 180].
pub fn validate_coordinates(field_prefix: &str, latitude: f64, longitude: f64) -> Result<()> {
    validate_range(&format!("{}latitude", field_prefix), latitude, -90.0, 90.0)?;
    validate_range(&format!("{}longitude", field_prefix), longitude, -180.0, 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("geocoding.endpoint", "https://example.com").is_ok());
        assert!(validate_url("geocoding.endpoint", "http://127.0.0.1:8080/v1/search").is_ok());
        assert!(validate_url("geocoding.endpoint", "").is_err());
        assert!(validate_url("geocoding.endpoint", "invalid-url").is_err());
        assert!(validate_url("geocoding.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates("", 55.68, 12.57).is_ok());
        assert!(validate_coordinates("", -90.0, 180.0).is_ok());
        assert!(validate_coordinates("", 91.0, 0.0).is_err());
        assert!(validate_coordinates("ephemeris.default_", 0.0, -181.0).is_err());
    }
}
