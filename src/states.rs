use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

const BUNDLED_TABLE: &str = include_str!("../data/state_lat_lon.json");

#[derive(Debug, Error)]
pub enum StateTableError {
    #[error("failed to read state table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse state table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("state table is empty")]
    Empty,
    #[error("unknown state {0:?}")]
    Unknown(String),
    #[error("coordinates for {state} are out of range ({latitude}, {longitude})")]
    OutOfRange {
        state: String,
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Renders the `lat,lon` segment of a points lookup. The weather service
    /// redirects anything finer than four decimals, so round up front.
    pub fn to_points_path(&self) -> String {
        format!(
            "{},{}",
            trim_decimal(self.latitude),
            trim_decimal(self.longitude)
        )
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn trim_decimal(value: f64) -> String {
    let rounded = format!("{:.4}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// State name to representative coordinates. Backed by a `BTreeMap` so
/// `names()` comes out sorted for the selector.
#[derive(Debug, Clone)]
pub struct StateTable {
    states: BTreeMap<String, Coordinates>,
}

impl StateTable {
    /// The table compiled into the binary: the fifty states and DC.
    pub fn bundled() -> Result<Self, StateTableError> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    pub fn from_path(path: &Path) -> Result<Self, StateTableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StateTableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StateTableError> {
        let states: BTreeMap<String, Coordinates> = serde_json::from_str(raw)?;
        if states.is_empty() {
            return Err(StateTableError::Empty);
        }
        if let Some((state, coords)) = states.iter().find(|(_, c)| !c.in_range()) {
            return Err(StateTableError::OutOfRange {
                state: state.clone(),
                latitude: coords.latitude,
                longitude: coords.longitude,
            });
        }
        Ok(Self { states })
    }

    pub fn names(&self) -> Vec<String> {
        self.states.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Coordinates> {
        self.states.get(name).copied()
    }

    /// Like `get`, for callers that treat an unknown name as an error.
    pub fn lookup(&self, name: &str) -> Result<Coordinates, StateTableError> {
        self.get(name)
            .ok_or_else(|| StateTableError::Unknown(name.to_string()))
    }
}
