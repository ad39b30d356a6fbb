use anyhow::Result;
use meteo_core::{AppError, Config, ConfigError};
use meteo_weather::{FetchParams, WeatherCache, WeatherStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    meteo_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            let err = match e.downcast::<ConfigError>() {
                Ok(config_err) => AppError::Config(config_err),
                Err(other) => AppError::Other(other),
            };
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };

    let cache = Arc::new(WeatherCache::new(&config.config_dir));
    let store = WeatherStore::from_config(&config.weather, cache)?;
    let params = FetchParams::from_config(&config.weather);

    tracing::info!("Fetching weather for {}, {}", params.latitude, params.longitude);
    store.fetch_weather(&params).await;

    if let Some(err) = store.error() {
        eprintln!("{}", err.user_message());
    }

    let Some(weather) = store.all_weather_data() else {
        println!("No weather data available.");
        return Ok(());
    };

    println!("Weather for {}, {} ({})", weather.latitude, weather.longitude, weather.timezone);

    let today = &weather.current_day;
    if let (Some(min), Some(max)) = (today.temperature_min, today.temperature_max) {
        println!("  Today: {} to {} {}", min.value, max.value, max.unit);
    }

    if let Some(hour) = store.current_hour_weather() {
        let temperature = hour
            .temperature
            .map(|t| format!("{} {}", t.value, t.unit))
            .unwrap_or_else(|| "n/a".to_string());
        let conditions = hour.weather_description.as_deref().unwrap_or("unknown");
        println!("  Now: {temperature}, {conditions}");
    }

    for day in &weather.forecast {
        let (Some(date), Some(min), Some(max)) = (day.day, day.temperature_min, day.temperature_max)
        else {
            continue;
        };
        println!("  {}: {} to {} {}", date.value, min.value, max.value, max.unit);
    }

    store.shutdown();
    Ok(())
}
