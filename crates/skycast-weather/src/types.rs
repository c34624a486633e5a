use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius value into this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Format a Celsius value for display in this unit, e.g. "21°".
    pub fn format_temp(self, celsius: f64) -> String {
        format!("{}°", self.from_celsius(celsius).round() as i64)
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    #[default]
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a WMO weather code to a condition category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Cloudy,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Get icon name for the presentation layer
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle => "cloud_rain",
            Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Current conditions block of a forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: i32,
    #[serde(rename = "weather_code")]
    pub weather_code: i32,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "surface_pressure")]
    pub pressure: f64,
    #[serde(rename = "apparent_temperature")]
    pub feels_like: f64,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// Hourly temperature series; `time` and `temperatures` are index-paired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperatures: Vec<f64>,
}

/// Daily min/max series; all arrays are index-paired with `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub max_temps: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub min_temps: Vec<f64>,
}

/// One retrieved or cached forecast payload. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailySeries>,
}

impl ForecastSnapshot {
    /// Check the series-pairing invariant: every timestamp array must line
    /// up with its value arrays. A violation means the payload is unusable.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.hourly.time.len() != self.hourly.temperatures.len() {
            return Err(WeatherError::Decode(format!(
                "hourly series mismatch: {} timestamps vs {} temperatures",
                self.hourly.time.len(),
                self.hourly.temperatures.len()
            )));
        }
        if let Some(daily) = &self.daily {
            if daily.time.len() != daily.max_temps.len()
                || daily.time.len() != daily.min_temps.len()
            {
                return Err(WeatherError::Decode(format!(
                    "daily series mismatch: {} timestamps vs {}/{} temperatures",
                    daily.time.len(),
                    daily.max_temps.len(),
                    daily.min_temps.len()
                )));
            }
        }
        Ok(())
    }
}

/// The one city the app is currently showing weather for.
/// Overwritten wholesale on selection, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub region: Option<String>,
}

/// One geocoding match. Ephemeral; persisted only when the user promotes it
/// to the selected city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "admin1")]
    pub region: Option<String>,
}

impl PlaceMatch {
    /// "Springfield, Illinois, United States"-style label for result
    /// lists; empty or redundant parts are skipped.
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(region) = self.region.as_deref() {
            if !region.is_empty() && region != self.name {
                parts.push(region);
            }
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}
