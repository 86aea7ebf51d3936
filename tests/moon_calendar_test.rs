use anyhow::Result;
use celestia_core::config::SourceStrategy;
use celestia_core::core::export::month_to_csv;
use celestia_core::{AppConfig, CalendarSource, EphemerisAggregator};
use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::with_defaults();
    config.ephemeris.endpoint = server.url("/v1/astronomy");
    config.http.timeout_seconds = 5;
    config
}

/// Open-Meteo style daily series for every day of February 2024.
fn february_payload() -> Value {
    let days: Vec<NaiveDate> = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .iter_days()
        .take(29)
        .collect();
    let time: Vec<String> = days.iter().map(|d| d.to_string()).collect();
    let sunrise: Vec<String> = days.iter().map(|d| format!("{}T06:45", d)).collect();
    let sunset: Vec<String> = days.iter().map(|d| format!("{}T16:20", d)).collect();
    let moonrise: Vec<Value> = days
        .iter()
        .enumerate()
        .map(|(i, d)| if i == 3 { Value::Null } else { json!(format!("{}T10:00", d)) })
        .collect();
    let moonset: Vec<String> = days.iter().map(|d| format!("{}T22:30", d)).collect();
    let phase: Vec<f64> = (0..29).map(|i| (0.35 + i as f64 / 29.5) % 1.0).collect();
    let illumination: Vec<f64> = (0..29).map(|i| 50.0 + (i as f64 * 1.5)).collect();

    json!({
        "latitude": 55.68,
        "longitude": 12.57,
        "timezone": "GMT",
        "utc_offset_seconds": 0,
        "daily": {
            "time": time,
            "sunrise": sunrise,
            "sunset": sunset,
            "moonrise": moonrise,
            "moonset": moonset,
            "moon_phase": phase,
            "moon_illumination": illumination
        }
    })
}

fn field_set(value: &Value) -> BTreeSet<String> {
    value
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_remote_month_is_normalized() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/astronomy")
            .query_param("start_date", "2024-02-01")
            .query_param("end_date", "2024-02-29")
            .query_param("timezone", "GMT");
        then.status(200).json_body(february_payload());
    });

    let aggregator = EphemerisAggregator::from_config(&config_for(&server))?;
    let calendar = aggregator.fetch_month(2024, 1, 55.68, 12.57).await?;

    api_mock.assert();
    assert_eq!(calendar.source, CalendarSource::Remote);
    assert_eq!(calendar.year, 2024);
    assert_eq!(calendar.month, 2);
    assert_eq!(calendar.days.len(), 29);

    let first = &calendar.days[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(first.weekday, "Thu");
    assert_eq!(first.phase, "Waxing Gibbous");
    assert_eq!(first.phase_slug, "waxing_gibbous");
    assert_eq!(first.illumination, 50);
    assert_eq!(first.moon_age, 10.3);
    assert_eq!(first.sign, "Aries");
    assert_eq!(first.recommendation, "Waxing Gibbous · 50% illuminated");
    assert_eq!(
        first.sunrise.map(|t| t.to_rfc3339()),
        Some("2024-02-01T06:45:00+00:00".to_string())
    );
    assert!(first.altitude.is_some());
    assert!(first.distance_km.is_some());
    assert!(calendar.days[3].moonrise.is_none());
    Ok(())
}

#[tokio::test]
async fn test_remote_offset_is_applied_to_naive_times() -> Result<()> {
    let server = MockServer::start();
    let mut payload = february_payload();
    payload["utc_offset_seconds"] = json!(3600);
    server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(200).json_body(payload);
    });

    let aggregator = EphemerisAggregator::from_config(&config_for(&server))?;
    let calendar = aggregator.fetch_month(2024, 1, 55.68, 12.57).await?;

    assert_eq!(
        calendar.days[0].sunrise.map(|t| t.to_rfc3339()),
        Some("2024-02-01T05:45:00+00:00".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_server_error_falls_back_to_local() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(500).body("upstream exploded");
    });

    let aggregator = EphemerisAggregator::from_config(&config_for(&server))?;
    let calendar = aggregator.fetch_month(2024, 1, 55.68, 12.57).await?;

    api_mock.assert_hits(1);
    assert_eq!(calendar.source, CalendarSource::LocalFallback);
    assert_eq!(calendar.days.len(), 29);
    assert_eq!(
        calendar.days.last().unwrap().date,
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn test_malformed_payload_falls_back_to_local() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(200).json_body(json!({
            "daily": {"time": ["2024-02-01", "2024-02-02"]}
        }));
    });

    let aggregator = EphemerisAggregator::from_config(&config_for(&server))?;
    let calendar = aggregator.fetch_month(2024, 1, 55.68, 12.57).await?;

    assert_eq!(calendar.source, CalendarSource::LocalFallback);
    assert_eq!(calendar.days.len(), 29);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_local() -> Result<()> {
    let mut config = AppConfig::with_defaults();
    config.ephemeris.endpoint = "http://127.0.0.1:9/v1/astronomy".to_string();
    config.http.timeout_seconds = 2;

    let aggregator = EphemerisAggregator::from_config(&config)?;
    let calendar = aggregator.fetch_month(2023, 0, -33.87, 151.21).await?;

    assert_eq!(calendar.source, CalendarSource::LocalFallback);
    assert_eq!(calendar.days.len(), 31);
    Ok(())
}

#[tokio::test]
async fn test_local_strategy_makes_no_request() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(200).json_body(february_payload());
    });

    let mut config = config_for(&server);
    config.ephemeris.strategy = SourceStrategy::Local;
    let aggregator = EphemerisAggregator::from_config(&config)?;
    let calendar = aggregator.fetch_month_at_default(2024, 1).await?;

    api_mock.assert_hits(0);
    assert_eq!(calendar.source, CalendarSource::Local);
    assert_eq!(calendar.days.len(), 29);
    Ok(())
}

#[tokio::test]
async fn test_remote_and_fallback_records_share_schema() -> Result<()> {
    let remote_server = MockServer::start();
    remote_server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(200).json_body(february_payload());
    });
    let failing_server = MockServer::start();
    failing_server.mock(|when, then| {
        when.method(GET).path("/v1/astronomy");
        then.status(503);
    });

    let remote = EphemerisAggregator::from_config(&config_for(&remote_server))?
        .fetch_month(2024, 1, 55.68, 12.57)
        .await?;
    let fallback = EphemerisAggregator::from_config(&config_for(&failing_server))?
        .fetch_month(2024, 1, 55.68, 12.57)
        .await?;

    assert_eq!(remote.source, CalendarSource::Remote);
    assert_eq!(fallback.source, CalendarSource::LocalFallback);

    let remote_json = serde_json::to_value(&remote)?;
    let fallback_json = serde_json::to_value(&fallback)?;
    assert_eq!(field_set(&remote_json), field_set(&fallback_json));
    for (r, f) in remote_json["days"]
        .as_array()
        .unwrap()
        .iter()
        .zip(fallback_json["days"].as_array().unwrap())
    {
        assert_eq!(field_set(r), field_set(f));
        assert_eq!(r["date"], f["date"]);
        assert_eq!(r["sign"], f["sign"]);
    }
    Ok(())
}

#[tokio::test]
async fn test_local_month_renders_as_csv() -> Result<()> {
    let mut config = AppConfig::with_defaults();
    config.ephemeris.strategy = SourceStrategy::Local;
    let calendar = EphemerisAggregator::from_config(&config)?
        .fetch_month_at_default(2024, 1)
        .await?;

    let csv = month_to_csv(&calendar)?;
    assert_eq!(csv.lines().count(), 30);
    assert!(csv.lines().nth(1).unwrap().starts_with("2024-02-01,Thu,"));
    Ok(())
}
