//! Desktop viewer for National Weather Service forecasts by US state.
//!
//! A state's representative coordinates come from a bundled table; the
//! forecast is resolved in two hops against `api.weather.gov`: the points
//! endpoint names a forecast URL, and that URL returns the forecast periods.

pub mod app;
pub mod config;
pub mod icon;
pub mod logging;
pub mod states;
pub mod weather;
pub mod weather_type;

pub use app::ForecastApp;
pub use config::Settings;
pub use states::{Coordinates, StateTable};
pub use weather::{fetch_forecast_blocking, format_forecast, Forecast, ForecastClient, ForecastError};
pub use weather_type::{determine_weather_type, WeatherType};

use anyhow::{Context, Result};
use tracing::info;

/// Load the state table named by `settings`, or the bundled one.
pub fn load_states(settings: &Settings) -> Result<StateTable> {
    let table = match &settings.states_path {
        Some(path) => {
            info!(path = %path.display(), "loading state table override");
            StateTable::from_path(path)?
        }
        None => StateTable::bundled()?,
    };
    Ok(table)
}

/// Headless lookup behind `--print`. The state is resolved before any
/// request goes out.
pub fn forecast_text(states: &StateTable, settings: &Settings, name: &str) -> Result<String> {
    let coords = states.lookup(name)?;
    let forecast = fetch_forecast_blocking(settings, coords)
        .with_context(|| format!("fetching forecast for {}", name))?;
    Ok(format_forecast(&forecast))
}

/// Open the window. Blocks until it is closed.
pub fn run_app(states: StateTable, settings: Settings, initial_state: Option<String>) -> Result<()> {
    let app = ForecastApp::new(states, settings, initial_state);

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(480.0, 240.0)),
        icon_data: Some(icon::icon_data()),
        ..Default::default()
    };

    info!("starting window");
    eframe::run_native(
        app::WINDOW_TITLE,
        native_options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("error running window: {e}"))
}
