use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::states::Coordinates;

/// Longest slice of an error body carried into `ForecastError::Status`.
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("weather service returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no forecast is published for {0}")]
    MissingForecastUrl(String),
    #[error("forecast at {0} has no periods")]
    NoPeriods(String),
}

// Points metadata: only the fields needed to reach the forecast.
#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    forecast: Option<String>,
    relative_location: Option<RelativeLocationFeature>,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationFeature {
    properties: RelativeLocation,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelativeLocation {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<Period>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub number: u32,
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    pub is_daytime: bool,
    pub temperature: Option<i32>,
    #[serde(default)]
    pub temperature_unit: String,
    #[serde(default)]
    pub wind_speed: String,
    #[serde(default)]
    pub wind_direction: String,
    #[serde(default)]
    pub short_forecast: String,
    pub detailed_forecast: String,
}

/// Where the points lookup sent us.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastLink {
    pub forecast_url: String,
    pub location: Option<RelativeLocation>,
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub location: Option<RelativeLocation>,
    pub periods: Vec<Period>,
}

impl Forecast {
    /// The period the window shows. Never `None` for a `Forecast` built by
    /// `ForecastClient`, which rejects empty period lists.
    pub fn current(&self) -> Option<&Period> {
        self.periods.first()
    }

    pub fn detailed_forecast(&self) -> &str {
        self.current()
            .map(|p| p.detailed_forecast.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    api_base: String,
}

impl ForecastClient {
    pub fn new(settings: &Settings) -> Result<Self, ForecastError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(ForecastError::Client)?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// First hop: coordinates to the forecast URL for their grid cell.
    pub async fn resolve_forecast_url(
        &self,
        coords: Coordinates,
    ) -> Result<ForecastLink, ForecastError> {
        let url = format!("{}/points/{}", self.api_base, coords.to_points_path());
        let point: PointResponse = self.get_json(&url).await?;

        let forecast_url = point
            .properties
            .forecast
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                warn!(url = %url, "point has no forecast url");
                ForecastError::MissingForecastUrl(coords.to_string())
            })?;

        Ok(ForecastLink {
            forecast_url,
            location: point.properties.relative_location.map(|f| f.properties),
        })
    }

    /// Second hop: the forecast document itself.
    pub async fn fetch_forecast(&self, url: &str) -> Result<Vec<Period>, ForecastError> {
        let forecast: ForecastResponse = self.get_json(url).await?;
        if forecast.properties.periods.is_empty() {
            warn!(url, "forecast has no periods");
            return Err(ForecastError::NoPeriods(url.to_string()));
        }
        Ok(forecast.properties.periods)
    }

    pub async fn forecast_for(&self, coords: Coordinates) -> Result<Forecast, ForecastError> {
        let link = self.resolve_forecast_url(coords).await?;
        let periods = self.fetch_forecast(&link.forecast_url).await?;
        Ok(Forecast {
            location: link.location,
            periods,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForecastError> {
        debug!(url, "requesting");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| {
                warn!(url, error = %source, "request failed");
                ForecastError::Request {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| {
                warn!(url, error = %source, "failed to read response body");
                ForecastError::Request {
                    url: url.to_string(),
                    source,
                }
            })?;

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "weather service error");
            return Err(ForecastError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| {
            warn!(url, error = %source, "response did not decode");
            ForecastError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}

/// Runs both hops on a throwaway current-thread runtime. Used from the
/// window's worker thread and from headless `--print` runs. The HTTP client
/// is built here too so its connection pool never outlives the runtime.
pub fn fetch_forecast_blocking(
    settings: &Settings,
    coords: Coordinates,
) -> Result<Forecast, ForecastError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ForecastError::Runtime)?;
    let client = ForecastClient::new(settings)?;
    rt.block_on(client.forecast_for(coords))
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Text shown in the result area and printed by `--print`.
pub fn format_forecast(forecast: &Forecast) -> String {
    let mut out = String::new();
    if let Some(location) = &forecast.location {
        out.push_str(&format!("Near {}, {}\n", location.city, location.state));
    }
    if let Some(period) = forecast.current() {
        out.push_str(&format!(
            "{} ({})\n",
            period.name,
            period.start_time.format("%a %b %-d, %-I:%M %p")
        ));
        if let Some(temp) = period.temperature {
            out.push_str(&format!(
                "{}°{}, wind {} {}\n",
                temp, period.temperature_unit, period.wind_speed, period.wind_direction
            ));
        }
        out.push('\n');
        out.push_str(&period.detailed_forecast);
    }
    out
}
