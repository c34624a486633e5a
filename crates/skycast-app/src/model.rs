//! Observable weather state driving the presentation layer.
//!
//! Holds "latest value" cells for the retrieval outcome, the selected city
//! name, and the unit preference, and mirrors the operations the front end
//! invokes: refresh, select a searched city, toggle the unit.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use skycast_weather::{
    CitySearchService, PlaceMatch, TemperatureUnit, WeatherProvider,
};

use crate::state::WeatherState;

pub struct WeatherModel {
    provider: Arc<WeatherProvider>,
    search: CitySearchService,
    state_tx: Arc<watch::Sender<WeatherState>>,
    city_tx: Arc<watch::Sender<String>>,
    unit_tx: Arc<watch::Sender<TemperatureUnit>>,
}

impl WeatherModel {
    /// Build the model, seeding the city and unit cells from the store.
    pub fn new(provider: Arc<WeatherProvider>, search: CitySearchService) -> Self {
        let (state_tx, _) = watch::channel(WeatherState::Loading);
        let (city_tx, _) = watch::channel(provider.selected_city().name);
        let (unit_tx, _) = watch::channel(provider.unit());

        Self {
            provider,
            search,
            state_tx: Arc::new(state_tx),
            city_tx: Arc::new(city_tx),
            unit_tx: Arc::new(unit_tx),
        }
    }

    /// Forecast-or-error cell.
    pub fn state(&self) -> watch::Receiver<WeatherState> {
        self.state_tx.subscribe()
    }

    /// Selected city name cell.
    pub fn city_name(&self) -> watch::Receiver<String> {
        self.city_tx.subscribe()
    }

    /// Unit preference cell.
    pub fn unit(&self) -> watch::Receiver<TemperatureUnit> {
        self.unit_tx.subscribe()
    }

    /// Search-results cell, re-exposed from the search service.
    pub fn search_results(&self) -> watch::Receiver<Vec<PlaceMatch>> {
        self.search.results()
    }

    /// Kick off a forecast refresh for the currently selected city. The
    /// outcome lands in the state cell; callers observe, they don't await.
    pub fn refresh(&self) {
        let provider = Arc::clone(&self.provider);
        let state_tx = Arc::clone(&self.state_tx);
        let city_tx = Arc::clone(&self.city_tx);

        state_tx.send_replace(WeatherState::Loading);
        tokio::spawn(async move {
            let city = provider.selected_city();
            city_tx.send_replace(city.name.clone());

            let state = match provider.get_forecast(city.latitude, city.longitude).await {
                Ok(snapshot) => WeatherState::Success {
                    snapshot,
                    city_name: city.name,
                },
                Err(e) => {
                    warn!("Forecast refresh failed: {}", e);
                    WeatherState::from_failure(&e)
                }
            };
            state_tx.send_replace(state);
        });
    }

    /// Forward a search box keystroke to the search service.
    pub fn on_search_query(&self, query: &str) {
        self.search.on_query_changed(query);
    }

    /// Persist the chosen place wholesale and refresh the forecast for it.
    pub fn select_city(&self, place: &PlaceMatch) {
        if let Err(e) = self.provider.save_selected_city(place) {
            warn!("Failed to persist selected city: {}", e);
        }
        self.city_tx.send_replace(place.name.clone());
        self.refresh();
    }

    /// Flip between Celsius and Fahrenheit and persist the choice.
    pub fn toggle_unit(&self) {
        let next = match *self.unit_tx.borrow() {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        };
        if let Err(e) = self.provider.save_unit(next) {
            warn!("Failed to persist unit preference: {}", e);
        }
        self.unit_tx.send_replace(next);
    }
}
