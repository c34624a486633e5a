use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;

use skycast_app::{WeatherModel, WeatherState};
use skycast_weather::{
    CitySearchService, ForecastSnapshot, OpenMeteoClient, PlaceMatch, PrefStore, TemperatureUnit,
    WeatherProvider,
};

/// How long the CLI waits for a search publish before giving up.
const SEARCH_WAIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;
    let config = skycast_core::Config::load()?;

    let client = Arc::new(OpenMeteoClient::new()?);
    let prefs = Arc::new(PrefStore::open(&config.config_dir)?);
    let provider = Arc::new(WeatherProvider::new(Arc::clone(&client), prefs));
    let search = CitySearchService::new(client);
    let model = WeatherModel::new(provider, search);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("search") => {
            let query = args.next().unwrap_or_default();
            run_search(&model, &query).await
        }
        Some("set-city") => {
            let query = args.next().unwrap_or_default();
            run_set_city(&model, &query).await
        }
        Some("watch") => run_watch(&model, config.weather.refresh_minutes).await,
        None => run_once(&model).await,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: skycast [search <query> | set-city <query> | watch]");
            Err(anyhow!("unknown command"))
        }
    }
}

/// Refresh once and print the outcome.
async fn run_once(model: &WeatherModel) -> Result<()> {
    // Subscribe before triggering so a fast fetch cannot publish unseen.
    let mut state_rx = model.state();
    model.refresh();
    await_forecast(model, &mut state_rx).await
}

/// Wait until the state cell settles on success or error.
async fn await_forecast(
    model: &WeatherModel,
    state_rx: &mut watch::Receiver<WeatherState>,
) -> Result<()> {
    let unit = *model.unit().borrow();

    loop {
        state_rx.changed().await?;
        let state = state_rx.borrow_and_update().clone();
        match state {
            WeatherState::Loading => continue,
            WeatherState::Success {
                snapshot,
                city_name,
            } => {
                print_forecast(&snapshot, &city_name, unit);
                return Ok(());
            }
            WeatherState::Error { message, .. } => return Err(anyhow!(message)),
        }
    }
}

/// Search for a city and print the matches.
async fn run_search(model: &WeatherModel, query: &str) -> Result<()> {
    let results = search_once(model, query).await?;
    if results.is_empty() {
        println!("No matches for {:?}", query);
        return Ok(());
    }
    for place in &results {
        println!(
            "{:>9.4} {:>9.4}  {}",
            place.latitude,
            place.longitude,
            place.label()
        );
    }
    Ok(())
}

/// Search, select the best match, and show its forecast.
async fn run_set_city(model: &WeatherModel, query: &str) -> Result<()> {
    let results = search_once(model, query).await?;
    let Some(first) = results.first() else {
        return Err(anyhow!("No matches for {:?}", query));
    };
    println!("Selected {}", first.label());

    // Selecting persists the city and kicks off a refresh for it.
    let mut state_rx = model.state();
    model.select_city(first);
    await_forecast(model, &mut state_rx).await
}

async fn search_once(model: &WeatherModel, query: &str) -> Result<Vec<PlaceMatch>> {
    let mut results_rx = model.search_results();
    model.on_search_query(query);

    tokio::time::timeout(SEARCH_WAIT, results_rx.changed())
        .await
        .map_err(|_| anyhow!("Search timed out"))??;
    let results = results_rx.borrow_and_update().clone();
    Ok(results)
}

/// Refresh on an interval until interrupted.
async fn run_watch(model: &WeatherModel, refresh_minutes: u32) -> Result<()> {
    if refresh_minutes == 0 {
        return run_once(model).await;
    }

    let interval = Duration::from_secs(u64::from(refresh_minutes) * 60);
    loop {
        if let Err(e) = run_once(model).await {
            tracing::warn!("Refresh failed: {}", e);
        }
        tokio::time::sleep(interval).await;
    }
}

fn print_forecast(snapshot: &ForecastSnapshot, city_name: &str, unit: TemperatureUnit) {
    let current = &snapshot.current;
    println!("{}: {}", city_name, current.condition().description());
    println!(
        "  {} (feels like {}), humidity {}%, wind {:.1} km/h, pressure {:.0} hPa",
        unit.format_temp(current.temperature),
        unit.format_temp(current.feels_like),
        current.humidity,
        current.wind_speed,
        current.pressure,
    );

    let upcoming = upcoming_hours(snapshot, unit, 6);
    if !upcoming.is_empty() {
        println!("  Next hours: {}", upcoming.join(" | "));
    }

    if let Some(daily) = &snapshot.daily {
        if let (Some(high), Some(low)) = (daily.max_temps.first(), daily.min_temps.first()) {
            println!(
                "  Today: high {} / low {}",
                unit.format_temp(*high),
                unit.format_temp(*low)
            );
        }
    }
}

/// First few hourly entries as "14:00 21°" labels. Timestamps that fail to
/// parse are shown verbatim rather than dropped.
fn upcoming_hours(snapshot: &ForecastSnapshot, unit: TemperatureUnit, count: usize) -> Vec<String> {
    snapshot
        .hourly
        .time
        .iter()
        .zip(&snapshot.hourly.temperatures)
        .take(count)
        .map(|(time, temp)| {
            let label = chrono::NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
                .map(|dt| dt.format("%H:%M").to_string())
                .unwrap_or_else(|_| time.clone());
            format!("{} {}", label, unit.format_temp(*temp))
        })
        .collect()
}
