//! Reshape the upstream flat arrays into past/current/forecast days with
//! nested hourly records.
//!
//! Day `d` owns hourly slots `[d * 24, d * 24 + 24)`. Slots or days missing
//! from the source produce records whose fields are `None`; nothing is
//! defaulted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::codes::describe_weather_code;
use crate::types::{
    DailyRecord, HourlyRecord, RawDaily, RawHourly, RawWeatherResponse, StructuredWeather, Unit,
    UnitValue, UvReading, Wind,
};
use crate::uv::classify_uv;

pub const HOURS_PER_DAY: usize = 24;

const SECONDS_PER_HOUR: f64 = 3600.0;
const METERS_PER_KILOMETER: f64 = 1000.0;

/// Partition `raw` into `past_days` days before today, today, and
/// `forecast_days` days after it.
pub fn reshape(raw: &RawWeatherResponse, past_days: u32, forecast_days: u32) -> StructuredWeather {
    let current_index = past_days as usize;
    let forecast_start = current_index + 1;
    let forecast_end = forecast_start + forecast_days as usize;

    StructuredWeather {
        latitude: raw.latitude,
        longitude: raw.longitude,
        timezone: raw.timezone.clone(),
        timezone_abbreviation: raw.timezone_abbreviation.clone(),
        past_days: (0..current_index).map(|d| build_day(raw, d)).collect(),
        current_day: build_day(raw, current_index),
        forecast: (forecast_start..forecast_end)
            .map(|d| build_day(raw, d))
            .collect(),
    }
}

fn build_day(raw: &RawWeatherResponse, day: usize) -> DailyRecord {
    let daily: &RawDaily = &raw.daily;
    let first_hour = day * HOURS_PER_DAY;

    DailyRecord {
        day: daily
            .time
            .get(day)
            .and_then(|t| parse_date(t))
            .map(|d| UnitValue::new(d, Unit::Iso8601)),
        hourly: (first_hour..first_hour + HOURS_PER_DAY)
            .map(|idx| build_hour(&raw.hourly, idx))
            .collect(),
        temperature_max: metric(&daily.temperature_2m_max, day, Unit::Celsius),
        temperature_min: metric(&daily.temperature_2m_min, day, Unit::Celsius),
        sunrise: timestamp(&daily.sunrise, day),
        sunset: timestamp(&daily.sunset, day),
        daylight_duration: value_at(&daily.daylight_duration, day)
            .map(|secs| UnitValue::new(secs / SECONDS_PER_HOUR, Unit::Hours)),
    }
}

fn build_hour(hourly: &RawHourly, idx: usize) -> HourlyRecord {
    let weather_code = value_at(&hourly.weather_code, idx).and_then(to_wmo_code);

    HourlyRecord {
        hour: hourly
            .time
            .get(idx)
            .and_then(|t| parse_datetime(t))
            .map(|t| UnitValue::new(t, Unit::Iso8601)),
        temperature: metric(&hourly.temperature_2m, idx, Unit::Celsius),
        relative_humidity: metric(&hourly.relative_humidity_2m, idx, Unit::Percent),
        dew_point: metric(&hourly.dew_point_2m, idx, Unit::Celsius),
        apparent_temperature: metric(&hourly.apparent_temperature, idx, Unit::Celsius),
        precipitation_probability: metric(&hourly.precipitation_probability, idx, Unit::Percent),
        precipitation: metric(&hourly.precipitation, idx, Unit::Millimeters),
        rain: metric(&hourly.rain, idx, Unit::Millimeters),
        snowfall: metric(&hourly.snowfall, idx, Unit::Centimeters),
        snow_depth: metric(&hourly.snow_depth, idx, Unit::Meters),
        weather_code: weather_code.map(|code| UnitValue::new(code, Unit::WmoCode)),
        weather_description: weather_code
            .and_then(describe_weather_code)
            .map(str::to_string),
        pressure_msl: metric(&hourly.pressure_msl, idx, Unit::Hectopascals),
        cloud_cover: metric(&hourly.cloud_cover, idx, Unit::Percent),
        visibility: value_at(&hourly.visibility, idx)
            .map(|m| UnitValue::new(m / METERS_PER_KILOMETER, Unit::Kilometers)),
        wind: metric(&hourly.wind_speed_10m, idx, Unit::KilometersPerHour).map(|speed| Wind {
            speed,
            direction: metric(&hourly.wind_direction_10m, idx, Unit::Degrees),
        }),
        uv: value_at(&hourly.uv_index, idx).map(|index| {
            let (risk_level, description) = classify_uv(index);
            UvReading {
                value: index,
                unit: Unit::Dimensionless,
                risk_level,
                description: description.to_string(),
            }
        }),
        is_day: value_at(&hourly.is_day, idx)
            .map(|flag| UnitValue::new(flag != 0.0, Unit::Dimensionless)),
    }
}

fn value_at(values: &[Option<f64>], idx: usize) -> Option<f64> {
    values.get(idx).copied().flatten()
}

fn metric(values: &[Option<f64>], idx: usize, unit: Unit) -> Option<UnitValue<f64>> {
    value_at(values, idx).map(|v| UnitValue::new(v, unit))
}

fn timestamp(values: &[Option<String>], idx: usize) -> Option<UnitValue<NaiveDateTime>> {
    values
        .get(idx)
        .and_then(|v| v.as_deref())
        .and_then(parse_datetime)
        .map(|t| UnitValue::new(t, Unit::Iso8601))
}

fn to_wmo_code(raw: f64) -> Option<i32> {
    raw.is_finite().then_some(raw as i32)
}

/// Upstream local timestamps look like `2025-03-04T13:00`.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
