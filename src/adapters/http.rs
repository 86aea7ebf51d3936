use crate::config::toml_config::HttpConfig;
use crate::utils::error::{CelestiaError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| CelestiaError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// Decode failures are the payload's fault; everything else is the transport's.
pub fn classify(service: &str, err: reqwest::Error) -> CelestiaError {
    if err.is_decode() {
        CelestiaError::malformed(service, err.to_string())
    } else {
        CelestiaError::service_unavailable(service, err.to_string())
    }
}

/// Rejects non-2xx responses with the status and body as context.
pub async fn ensure_success(service: &str, response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("{} response status: {}", service, status);
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CelestiaError::service_unavailable(
        service,
        format!("HTTP {}: {}", status, body.trim()),
    ))
}

/// Reads the body as JSON into `T`; unparsable bodies are `MalformedResponse`.
pub async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(|e| classify(service, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CelestiaError::malformed(service, e.to_string()))
}
