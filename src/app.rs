use std::sync::{Arc, Mutex, MutexGuard};

use eframe::{egui, App, Frame};
use tracing::{info, warn};

use crate::config::Settings;
use crate::states::{Coordinates, StateTable};
use crate::weather::{fetch_forecast_blocking, format_forecast, Forecast};
use crate::weather_type::{determine_weather_type, WeatherType};

pub const WINDOW_TITLE: &str = "State Forecast";
pub const NO_SELECTION_MESSAGE: &str = "Please select state";

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading { state: String },
    Done,
}

/// What the worker thread hands back to the UI thread.
#[derive(Debug)]
pub struct FetchOutcome {
    pub state: String,
    pub result: Result<Forecast, String>,
}

type OutcomeSlot = Arc<Mutex<Option<FetchOutcome>>>;

pub struct ForecastApp {
    states: StateTable,
    names: Vec<String>,
    settings: Settings,
    selected: Option<String>,
    status: FetchStatus,
    result_text: String,
    weather_type: Option<WeatherType>,
    animation_time: f64,
    pending: OutcomeSlot,
}

fn lock_slot(slot: &OutcomeSlot) -> MutexGuard<'_, Option<FetchOutcome>> {
    // A worker that panicked mid-write leaves nothing worth protecting.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl App for ForecastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let taken = lock_slot(&self.pending).take();
        if let Some(outcome) = taken {
            self.apply_outcome(outcome);
        }

        if self.is_loading() || self.weather_type.is_some() {
            self.animation_time += ctx.input(|i| i.unstable_dt) as f64;
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Please Select State:");

            egui::ComboBox::from_id_source("state_select")
                .selected_text(self.selected.as_deref().unwrap_or(""))
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for name in &self.names {
                        ui.selectable_value(&mut self.selected, Some(name.clone()), name.as_str());
                    }
                });

            let button = egui::Button::new("Get Forecast");
            if ui.add_enabled(!self.is_loading(), button).clicked() {
                self.request_forecast(ctx);
            }

            if let FetchStatus::Loading { state } = &self.status {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Fetching forecast for {}...", state));
                });
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if let Some(weather_type) = self.weather_type {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(48.0, 48.0), egui::Sense::hover());
                        draw_condition(ui.painter(), rect, weather_type, self.animation_time);
                    }
                    ui.add(egui::Label::new(self.result_text.as_str()).wrap(true));
                });
        });
    }
}

impl ForecastApp {
    pub fn new(states: StateTable, settings: Settings, initial_state: Option<String>) -> Self {
        let names = states.names();
        let selected = initial_state.filter(|s| states.get(s).is_some());
        Self {
            states,
            names,
            settings,
            selected,
            status: FetchStatus::Idle,
            result_text: String::new(),
            weather_type: None,
            animation_time: 0.0,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading { .. })
    }

    /// Moves to `Loading` and returns what the worker needs, or `None` when
    /// no request should go out.
    pub fn begin_request(&mut self) -> Option<(String, Coordinates)> {
        if self.is_loading() {
            return None;
        }
        let state = match self.selected.clone() {
            Some(state) => state,
            None => {
                self.result_text = NO_SELECTION_MESSAGE.to_string();
                self.weather_type = None;
                return None;
            }
        };
        let coords = match self.states.get(&state) {
            Some(coords) => coords,
            None => {
                self.result_text = format!("No coordinates for {}", state);
                self.weather_type = None;
                return None;
            }
        };
        self.status = FetchStatus::Loading {
            state: state.clone(),
        };
        Some((state, coords))
    }

    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome.result {
            Ok(forecast) => {
                info!(state = %outcome.state, "forecast ready");
                self.weather_type = forecast
                    .current()
                    .map(|p| determine_weather_type(&p.short_forecast));
                self.result_text = format_forecast(&forecast);
            }
            Err(message) => {
                warn!(state = %outcome.state, error = %message, "forecast failed");
                self.weather_type = None;
                self.result_text = format!("Could not get forecast for {}: {}", outcome.state, message);
            }
        }
        self.status = FetchStatus::Done;
    }

    fn request_forecast(&mut self, ctx: &egui::Context) {
        let Some((state, coords)) = self.begin_request() else {
            return;
        };
        info!(%state, %coords, "fetching forecast");

        let slot = Arc::clone(&self.pending);
        let settings = self.settings.clone();
        let ctx = ctx.clone();

        // One worker per lookup keeps the window responsive.
        std::thread::spawn(move || {
            let result = fetch_forecast_blocking(&settings, coords).map_err(|e| e.to_string());
            *lock_slot(&slot) = Some(FetchOutcome { state, result });
            ctx.request_repaint();
        });
    }
}

fn draw_condition(painter: &egui::Painter, rect: egui::Rect, kind: WeatherType, time: f64) {
    let c = rect.center();
    let r = rect.width() * 0.5;
    let sun = egui::Color32::from_rgb(255, 214, 10);
    let grey = egui::Color32::from_rgb(190, 190, 190);
    let blue = egui::Color32::from_rgb(100, 150, 255);

    let cloud = |center: egui::Pos2, size: f32| {
        painter.circle_filled(center, size, grey);
        painter.circle_filled(center + egui::vec2(-size * 0.7, size * 0.2), size * 0.7, grey);
        painter.circle_filled(center + egui::vec2(size * 0.7, size * 0.2), size * 0.7, grey);
    };
    // 0..1 sawtooth offset per index, for falling things
    let fall = |i: usize, speed: f64| ((time * speed + i as f64 * 0.37).fract()) as f32;

    match kind {
        WeatherType::Clear => {
            for i in 0..8 {
                let a = i as f32 * std::f32::consts::TAU / 8.0 + (time * 0.5) as f32;
                let dir = egui::vec2(a.cos(), a.sin());
                painter.line_segment(
                    [c + dir * r * 0.6, c + dir * r * 0.9],
                    egui::Stroke::new(2.0, sun),
                );
            }
            painter.circle_filled(c, r * 0.45, sun);
        }
        WeatherType::PartlyCloudy => {
            painter.circle_filled(c + egui::vec2(-r * 0.3, -r * 0.3), r * 0.4, sun);
            let drift = (time.sin() * 3.0) as f32;
            cloud(c + egui::vec2(r * 0.1 + drift, r * 0.2), r * 0.35);
        }
        WeatherType::Cloudy => {
            cloud(c + egui::vec2(-r * 0.2, -r * 0.2), r * 0.35);
            cloud(c + egui::vec2(r * 0.2, r * 0.15), r * 0.4);
        }
        WeatherType::Rain | WeatherType::Thunderstorm => {
            for i in 0..6 {
                let x = c.x - r * 0.6 + i as f32 * r * 0.24;
                let y = c.y + fall(i, 1.5) * r * 0.9;
                painter.line_segment(
                    [egui::pos2(x, y), egui::pos2(x, y + r * 0.15)],
                    egui::Stroke::new(1.5, blue),
                );
            }
            if kind == WeatherType::Thunderstorm && (time * 3.0) as i64 % 2 == 0 {
                let bolt = [
                    c + egui::vec2(0.0, -r * 0.1),
                    c + egui::vec2(-r * 0.15, r * 0.35),
                    c + egui::vec2(r * 0.1, r * 0.3),
                    c + egui::vec2(-r * 0.05, r * 0.8),
                ];
                for pair in bolt.windows(2) {
                    painter.line_segment([pair[0], pair[1]], egui::Stroke::new(2.5, sun));
                }
            }
            cloud(c + egui::vec2(0.0, -r * 0.45), r * 0.35);
        }
        WeatherType::Snow => {
            for i in 0..5 {
                let x = c.x - r * 0.6 + i as f32 * r * 0.3 + ((time + i as f64).sin() * 2.0) as f32;
                let y = c.y + fall(i, 0.6) * r * 0.9;
                painter.circle_filled(egui::pos2(x, y), 2.0, egui::Color32::WHITE);
            }
            cloud(c + egui::vec2(0.0, -r * 0.45), r * 0.35);
        }
        WeatherType::Fog => {
            for i in 0..3 {
                let y = c.y - r * 0.4 + i as f32 * r * 0.4;
                let shift = ((time * 0.8 + i as f64).sin() * r as f64 * 0.15) as f32;
                painter.line_segment(
                    [egui::pos2(c.x - r * 0.8 + shift, y), egui::pos2(c.x + r * 0.8 + shift, y)],
                    egui::Stroke::new(4.0, grey),
                );
            }
        }
    }
}
