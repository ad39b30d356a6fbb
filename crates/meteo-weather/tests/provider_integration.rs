//! Integration tests for WeatherProvider against a mock forecast endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use meteo_weather::{
    DailyField, ErrorKind, FetchParams, HourlyField, Severity, WeatherFetcher, WeatherProvider,
};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upstream body covering `days` days of hourly and daily data.
fn forecast_body(days: usize) -> serde_json::Value {
    let hours = days * 24;
    let hourly_time: Vec<String> = (0..hours)
        .map(|h| format!("2025-03-{:02}T{:02}:00", 4 + h / 24, h % 24))
        .collect();
    let daily_time: Vec<String> = (0..days).map(|d| format!("2025-03-{:02}", 4 + d)).collect();

    serde_json::json!({
        "latitude": 40.71,
        "longitude": -74.01,
        "timezone": "America/New_York",
        "timezone_abbreviation": "EST",
        "current": { "time": "2025-03-04T10:00" },
        "hourly": {
            "time": hourly_time,
            "temperature_2m": (0..hours).map(|h| h as f64 / 10.0).collect::<Vec<_>>(),
            "weather_code": vec![3; hours],
        },
        "daily": {
            "time": daily_time,
            "temperature_2m_max": vec![12.5; days],
            "temperature_2m_min": vec![2.0; days],
        }
    })
}

fn provider_for(server: &MockServer) -> WeatherProvider {
    WeatherProvider::with_endpoint(format!("{}/v1/forecast", server.uri()), Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_fetch_success_is_reshaped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(4)))
        .mount(&mock_server)
        .await;

    let params = FetchParams::new(40.7128, -74.006)
        .with_past_days(1)
        .with_forecast_days(2);
    let weather = provider_for(&mock_server).fetch(&params).await.unwrap();

    assert_eq!(weather.timezone, "America/New_York");
    assert_eq!(weather.past_days.len(), 1);
    assert_eq!(weather.forecast.len(), 2);
    assert_eq!(weather.current_day.hourly.len(), 24);
    assert_eq!(
        weather.current_day.day.unwrap().value.to_string(),
        "2025-03-05"
    );
    assert_eq!(weather.current_day.temperature_max.unwrap().value, 12.5);
    assert_eq!(
        weather.current_day.hourly[0].weather_description.as_deref(),
        Some("Overcast")
    );
}

#[tokio::test]
async fn test_query_string_uses_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40.7128"))
        .and(query_param("longitude", "-74.006"))
        .and(query_param("hourly", "temperature_2m,weather_code"))
        .and(query_param("daily", "temperature_2m_max,temperature_2m_min"))
        .and(query_param("timezone", "America/Sao_Paulo"))
        .and(query_param("past_days", "0"))
        .and(query_param("forecast_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(8)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let weather = provider_for(&mock_server)
        .fetch(&FetchParams::new(40.7128, -74.006))
        .await
        .unwrap();

    assert_eq!(weather.forecast.len(), 7);
}

#[tokio::test]
async fn test_query_string_uses_explicit_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("hourly", "uv_index,is_day"))
        .and(query_param("daily", "sunrise,sunset"))
        .and(query_param("timezone", "Europe/Madrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = FetchParams::new(40.4168, -3.7038)
        .with_hourly([HourlyField::UvIndex, HourlyField::IsDay])
        .with_daily([DailyField::Sunrise, DailyField::Sunset])
        .with_timezone("Europe/Madrid")
        .with_forecast_days(0);

    provider_for(&mock_server).fetch(&params).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&FetchParams::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Api);
    assert_eq!(err.severity, Severity::Error);
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn test_client_error_is_api_warning() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°."
        })))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&FetchParams::new(120.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Api);
    assert_eq!(err.severity, Severity::Warning);
    assert_eq!(err.status, Some(400));
}

#[tokio::test]
async fn test_request_timeout_status_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(408))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&FetchParams::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.status, Some(408));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(8))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_endpoint(
        format!("{}/v1/forecast", mock_server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = provider
        .fetch(&FetchParams::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.severity, Severity::Warning);
    assert_eq!(err.status, Some(408));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_malformed_body_is_unknown_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&FetchParams::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.severity, Severity::Error);
    assert_eq!(err.status, Some(0));
}

#[tokio::test]
async fn test_unreachable_server_is_unknown_error() {
    // Nothing listens on port 1
    let provider =
        WeatherProvider::with_endpoint("http://127.0.0.1:1/v1/forecast", Duration::from_secs(2))
            .unwrap();
    let err = provider
        .fetch(&FetchParams::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unknown);
}
