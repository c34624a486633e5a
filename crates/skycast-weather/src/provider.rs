//! Weather retrieval with last-known-good fallback, plus the persisted
//! city and unit preferences.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::OpenMeteoClient;
use crate::error::WeatherError;
use crate::prefs::PrefStore;
use crate::types::{ForecastSnapshot, PlaceMatch, SelectedCity, TemperatureUnit};

// One cache slot, keyed globally rather than per city: a fetch failure
// right after switching cities can surface the previous city's snapshot.
const KEY_LAST_FORECAST: &str = "last_forecast";

const KEY_CITY_NAME: &str = "city_name";
const KEY_CITY_LAT: &str = "lat";
const KEY_CITY_LON: &str = "lon";
const KEY_CITY_COUNTRY: &str = "country";
const KEY_CITY_REGION: &str = "region";
const KEY_IS_CELSIUS: &str = "is_celsius";

/// Fallback location when no city has ever been selected.
const DEFAULT_CITY_NAME: &str = "Warsaw";
const DEFAULT_CITY_LAT: f64 = 52.23;
const DEFAULT_CITY_LON: f64 = 21.01;

pub struct WeatherProvider {
    client: Arc<OpenMeteoClient>,
    prefs: Arc<PrefStore>,
}

impl WeatherProvider {
    pub fn new(client: Arc<OpenMeteoClient>, prefs: Arc<PrefStore>) -> Self {
        Self { client, prefs }
    }

    /// Network-then-cache forecast lookup. Exactly one fetch attempt: on
    /// success the snapshot replaces the cache slot and is returned; on
    /// failure the last cached snapshot is served instead, and only when
    /// both fail does the caller see an error (carrying the fetch failure).
    pub async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastSnapshot, WeatherError> {
        match self.client.fetch_forecast(latitude, longitude).await {
            Ok(snapshot) => {
                self.store_cached(&snapshot);
                Ok(snapshot)
            }
            Err(fetch_err) => {
                debug!("Forecast fetch failed, trying cache: {}", fetch_err);
                match self.cached_forecast() {
                    Some(snapshot) => Ok(snapshot),
                    None => Err(WeatherError::CacheMiss {
                        source: Box::new(fetch_err),
                    }),
                }
            }
        }
    }

    // Cache writes are fire-and-forget: a persistence hiccup must not turn
    // a successful fetch into a failure.
    fn store_cached(&self, snapshot: &ForecastSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => {
                if let Err(e) = self.prefs.put_string(KEY_LAST_FORECAST, &json) {
                    warn!("Failed to persist forecast cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize forecast for cache: {}", e),
        }
    }

    fn cached_forecast(&self) -> Option<ForecastSnapshot> {
        let raw = self.prefs.get_string(KEY_LAST_FORECAST)?;
        match serde_json::from_str::<ForecastSnapshot>(&raw) {
            Ok(snapshot) => match snapshot.validate() {
                Ok(()) => Some(snapshot),
                Err(e) => {
                    warn!("Cached forecast is unusable, ignoring: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Cached forecast failed to parse, ignoring: {}", e);
                None
            }
        }
    }

    /// The city weather is currently shown for; falls back to Warsaw when
    /// nothing was ever saved.
    pub fn selected_city(&self) -> SelectedCity {
        SelectedCity {
            name: self
                .prefs
                .get_string(KEY_CITY_NAME)
                .unwrap_or_else(|| DEFAULT_CITY_NAME.to_string()),
            latitude: self.prefs.get_f64(KEY_CITY_LAT).unwrap_or(DEFAULT_CITY_LAT),
            longitude: self.prefs.get_f64(KEY_CITY_LON).unwrap_or(DEFAULT_CITY_LON),
            country: self.prefs.get_string(KEY_CITY_COUNTRY).unwrap_or_default(),
            region: self.prefs.get_string(KEY_CITY_REGION),
        }
    }

    /// Overwrite the selection wholesale. No coordinate validation; the
    /// geocoding service is trusted for ranges.
    pub fn save_selected_city(&self, place: &PlaceMatch) -> anyhow::Result<()> {
        self.prefs.put_string(KEY_CITY_NAME, &place.name)?;
        self.prefs.put_f64(KEY_CITY_LAT, place.latitude)?;
        self.prefs.put_f64(KEY_CITY_LON, place.longitude)?;
        self.prefs.put_string(KEY_CITY_COUNTRY, &place.country)?;
        match place.region.as_deref() {
            Some(region) => self.prefs.put_string(KEY_CITY_REGION, region)?,
            None => self.prefs.remove(KEY_CITY_REGION)?,
        }
        Ok(())
    }

    pub fn unit(&self) -> TemperatureUnit {
        if self.prefs.get_bool(KEY_IS_CELSIUS).unwrap_or(true) {
            TemperatureUnit::Celsius
        } else {
            TemperatureUnit::Fahrenheit
        }
    }

    pub fn save_unit(&self, unit: TemperatureUnit) -> anyhow::Result<()> {
        self.prefs
            .put_bool(KEY_IS_CELSIUS, unit == TemperatureUnit::Celsius)
    }
}
