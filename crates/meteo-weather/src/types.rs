use chrono::{NaiveDate, NaiveDateTime};
use meteo_core::WeatherConfig;
use serde::{Deserialize, Serialize};

use crate::uv::UvRiskLevel;

/// Default hourly fields requested when none are given.
pub const DEFAULT_HOURLY: [HourlyField; 2] = [HourlyField::Temperature2m, HourlyField::WeatherCode];
/// Default daily fields requested when none are given.
pub const DEFAULT_DAILY: [DailyField; 2] = [DailyField::Temperature2mMax, DailyField::Temperature2mMin];
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_PAST_DAYS: u32 = 0;
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

/// Unit tag attached to every measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "ºC")]
    Celsius,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "º")]
    Degrees,
    #[serde(rename = "hPa")]
    Hectopascals,
    #[serde(rename = "wmo code")]
    WmoCode,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "iso8601")]
    Iso8601,
    #[serde(rename = "")]
    Dimensionless,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "ºC",
            Self::Percent => "%",
            Self::Millimeters => "mm",
            Self::Centimeters => "cm",
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::KilometersPerHour => "km/h",
            Self::Degrees => "º",
            Self::Hectopascals => "hPa",
            Self::WmoCode => "wmo code",
            Self::Hours => "h",
            Self::Iso8601 => "iso8601",
            Self::Dimensionless => "",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value paired with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue<T> {
    pub value: T,
    pub unit: Unit,
}

impl<T> UnitValue<T> {
    pub const fn new(value: T, unit: Unit) -> Self {
        Self { value, unit }
    }
}

/// Hourly variables offered by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourlyField {
    Time,
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    #[serde(rename = "relative_humidity_2m")]
    RelativeHumidity2m,
    #[serde(rename = "dew_point_2m")]
    DewPoint2m,
    ApparentTemperature,
    PrecipitationProbability,
    Precipitation,
    Rain,
    Snowfall,
    SnowDepth,
    WeatherCode,
    PressureMsl,
    CloudCover,
    Visibility,
    #[serde(rename = "wind_speed_10m")]
    WindSpeed10m,
    #[serde(rename = "wind_direction_10m")]
    WindDirection10m,
    UvIndex,
    IsDay,
}

impl HourlyField {
    /// Name used in the request query string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Temperature2m => "temperature_2m",
            Self::RelativeHumidity2m => "relative_humidity_2m",
            Self::DewPoint2m => "dew_point_2m",
            Self::ApparentTemperature => "apparent_temperature",
            Self::PrecipitationProbability => "precipitation_probability",
            Self::Precipitation => "precipitation",
            Self::Rain => "rain",
            Self::Snowfall => "snowfall",
            Self::SnowDepth => "snow_depth",
            Self::WeatherCode => "weather_code",
            Self::PressureMsl => "pressure_msl",
            Self::CloudCover => "cloud_cover",
            Self::Visibility => "visibility",
            Self::WindSpeed10m => "wind_speed_10m",
            Self::WindDirection10m => "wind_direction_10m",
            Self::UvIndex => "uv_index",
            Self::IsDay => "is_day",
        }
    }

    pub const fn all() -> &'static [HourlyField] {
        &[
            Self::Time,
            Self::Temperature2m,
            Self::RelativeHumidity2m,
            Self::DewPoint2m,
            Self::ApparentTemperature,
            Self::PrecipitationProbability,
            Self::Precipitation,
            Self::Rain,
            Self::Snowfall,
            Self::SnowDepth,
            Self::WeatherCode,
            Self::PressureMsl,
            Self::CloudCover,
            Self::Visibility,
            Self::WindSpeed10m,
            Self::WindDirection10m,
            Self::UvIndex,
            Self::IsDay,
        ]
    }
}

/// Daily variables offered by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyField {
    #[serde(rename = "temperature_2m_max")]
    Temperature2mMax,
    #[serde(rename = "temperature_2m_min")]
    Temperature2mMin,
    #[serde(rename = "sunrise")]
    Sunrise,
    #[serde(rename = "sunset")]
    Sunset,
    #[serde(rename = "daylight_duration")]
    DaylightDuration,
}

impl DailyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature2mMax => "temperature_2m_max",
            Self::Temperature2mMin => "temperature_2m_min",
            Self::Sunrise => "sunrise",
            Self::Sunset => "sunset",
            Self::DaylightDuration => "daylight_duration",
        }
    }

    pub const fn all() -> &'static [DailyField] {
        &[
            Self::Temperature2mMax,
            Self::Temperature2mMin,
            Self::Sunrise,
            Self::Sunset,
            Self::DaylightDuration,
        ]
    }
}

/// Request parameters. Absent fields take the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<Vec<HourlyField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<Vec<DailyField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u32>,
}

impl FetchParams {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            hourly: None,
            daily: None,
            timezone: None,
            past_days: None,
            forecast_days: None,
        }
    }

    /// Location, timezone and day counts from the configuration; field lists
    /// stay at their defaults.
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.latitude, config.longitude)
            .with_timezone(config.timezone.clone())
            .with_past_days(config.past_days)
            .with_forecast_days(config.forecast_days)
    }

    pub fn with_hourly(mut self, fields: impl Into<Vec<HourlyField>>) -> Self {
        self.hourly = Some(fields.into());
        self
    }

    pub fn with_daily(mut self, fields: impl Into<Vec<DailyField>>) -> Self {
        self.daily = Some(fields.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_past_days(mut self, days: u32) -> Self {
        self.past_days = Some(days);
        self
    }

    pub fn with_forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = Some(days);
        self
    }

    /// Substitute defaults for every absent field.
    pub fn resolved(&self) -> ResolvedParams {
        ResolvedParams {
            latitude: self.latitude,
            longitude: self.longitude,
            hourly: self.hourly.clone().unwrap_or_else(|| DEFAULT_HOURLY.to_vec()),
            daily: self.daily.clone().unwrap_or_else(|| DEFAULT_DAILY.to_vec()),
            timezone: self
                .timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            past_days: self.past_days.unwrap_or(DEFAULT_PAST_DAYS),
            forecast_days: self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS),
        }
    }
}

/// `FetchParams` with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: Vec<HourlyField>,
    pub daily: Vec<DailyField>,
    pub timezone: String,
    pub past_days: u32,
    pub forecast_days: u32,
}

impl ResolvedParams {
    /// Query-string pairs in upstream naming.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("hourly", join_fields(self.hourly.iter().map(HourlyField::as_str))),
            ("daily", join_fields(self.daily.iter().map(DailyField::as_str))),
            ("timezone", self.timezone.clone()),
            ("past_days", self.past_days.to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }
}

fn join_fields<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

/// Wind composite; speed is always present, direction may not be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: UnitValue<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<UnitValue<f64>>,
}

/// UV index with its classified risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvReading {
    pub value: f64,
    pub unit: Unit,
    pub risk_level: UvRiskLevel,
    pub description: String,
}

/// One hour of data. Fields are `None` when the source had no value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<UnitValue<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_depth: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<UnitValue<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_msl: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<UvReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day: Option<UnitValue<bool>>,
}

/// One day of data with its hourly breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<UnitValue<NaiveDate>>,
    #[serde(default)]
    pub hourly: Vec<HourlyRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_max: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_min: Option<UnitValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<UnitValue<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<UnitValue<NaiveDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daylight_duration: Option<UnitValue<f64>>,
}

/// Reshaped result: past days, today, and the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredWeather {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_abbreviation: Option<String>,
    pub past_days: Vec<DailyRecord>,
    pub current_day: DailyRecord,
    /// Always `forecast_days` long. The upstream returns `past_days +
    /// forecast_days` days counting today, so the last entry is usually
    /// empty: `day` is `None` and its 24 hours carry no fields.
    pub forecast: Vec<DailyRecord>,
}

/// Upstream response body: parallel arrays indexed by hour or by day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeatherResponse {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_abbreviation: Option<String>,
    #[serde(default)]
    pub hourly: RawHourly,
    #[serde(default)]
    pub daily: RawDaily,
}

/// Values are `Option` per slot because the API emits `null` for gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub dew_point_2m: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub rain: Vec<Option<f64>>,
    pub snowfall: Vec<Option<f64>>,
    pub snow_depth: Vec<Option<f64>>,
    pub weather_code: Vec<Option<f64>>,
    pub pressure_msl: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    pub is_day: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub daylight_duration: Vec<Option<f64>>,
}
