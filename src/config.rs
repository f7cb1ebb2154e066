use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://api.weather.gov";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_BASE: &str = "STATE_FORECAST_API_BASE";
const ENV_USER_AGENT: &str = "STATE_FORECAST_USER_AGENT";
const ENV_TIMEOUT: &str = "STATE_FORECAST_TIMEOUT_SECS";
const ENV_STATES: &str = "STATE_FORECAST_STATES";
const ENV_LOG_FILE: &str = "STATE_FORECAST_LOG_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

pub fn default_user_agent() -> String {
    format!(
        "{}/{} (github.com/state-forecast)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Override for the bundled state table.
    pub states_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            states_path: None,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(base) = get(ENV_API_BASE) {
            settings.api_base = base;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            settings.user_agent = agent;
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            settings.timeout_secs = parse_timeout(ENV_TIMEOUT, &raw)?;
        }
        settings.states_path = get(ENV_STATES).map(PathBuf::from);
        settings.log_file = get(ENV_LOG_FILE).map(PathBuf::from);

        Ok(settings)
    }
}

pub fn parse_timeout(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}

/// Places a `.env` may live, in priority order: working directory,
/// executable directory, then `$HOME/.state_forecast.env`.
pub fn env_file_candidates(cwd: &Path, exe_dir: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(".env")];
    if let Some(dir) = exe_dir {
        paths.push(dir.join(".env"));
    }
    if let Some(home) = home {
        paths.push(home.join(".state_forecast.env"));
    }
    paths
}

fn default_env_file_candidates() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let home = std::env::var_os("HOME").map(PathBuf::from);
    env_file_candidates(Path::new("."), exe_dir.as_deref(), home.as_deref())
}

/// What the `.env` search did. Built before logging is up, so it is kept
/// and replayed through `log` once the subscriber exists.
#[derive(Debug, Default)]
pub struct EnvFileReport {
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub loaded: Option<PathBuf>,
}

impl EnvFileReport {
    pub fn log(&self) {
        for path in &self.missing {
            debug!(path = %path.display(), "no env file");
        }
        for (path, error) in &self.failed {
            warn!(path = %path.display(), error = %error, "failed to load env file");
        }
        match &self.loaded {
            Some(path) => info!(path = %path.display(), "loaded env file"),
            None => debug!("no env file loaded"),
        }
    }
}

/// Loads the first `.env` among `candidates` that parses. A broken file is
/// recorded and skipped. Variables already in the environment win over the
/// file.
pub fn load_env_file_from(candidates: Vec<PathBuf>) -> EnvFileReport {
    let mut report = EnvFileReport::default();
    for path in candidates {
        if !path.exists() {
            report.missing.push(path);
            continue;
        }
        match dotenv::from_path(&path) {
            Ok(()) => {
                report.loaded = Some(path);
                break;
            }
            Err(e) => report.failed.push((path, e.to_string())),
        }
    }
    report
}

pub fn load_env_file() -> EnvFileReport {
    load_env_file_from(default_env_file_candidates())
}
