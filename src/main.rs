use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use state_forecast::config::{self, Settings};
use state_forecast::{forecast_text, load_states, logging, run_app};

#[derive(Parser)]
#[command(name = "state_forecast")]
#[command(about = "National Weather Service forecast for a US state", long_about = None)]
struct Cli {
    /// State to select on startup (e.g. "New Mexico")
    #[arg(short, long)]
    state: Option<String>,

    /// Print the forecast for --state instead of opening a window
    #[arg(short, long, requires = "state")]
    print: bool,

    /// List the known states and exit
    #[arg(long)]
    list_states: bool,

    /// JSON file of state coordinates to use instead of the bundled table
    #[arg(long, value_name = "FILE")]
    states: Option<PathBuf>,

    /// Weather API base URL
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// User-Agent sent to the weather service (ideally with contact info)
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(base) = &self.api_base {
            settings.api_base = base.clone();
        }
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout_secs = config::parse_timeout("--timeout-secs", &secs.to_string())?;
        }
        if let Some(path) = &self.states {
            settings.states_path = Some(path.clone());
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // dotenv before logging so STATE_FORECAST_LOG_FILE can come from the
    // file; the search is replayed once the subscriber is installed
    let env_report = config::load_env_file();
    let mut settings = Settings::from_env().context("reading configuration")?;
    cli.apply(&mut settings)?;

    logging::init_logging(settings.log_file.as_deref())?;
    env_report.log();

    let states = load_states(&settings)?;

    if cli.list_states {
        for name in states.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    match (&cli.state, cli.print) {
        (Some(name), true) => {
            println!("{}", forecast_text(&states, &settings, name)?);
            Ok(())
        }
        (Some(name), false) => {
            states.lookup(name).context("see --list-states")?;
            run_app(states, settings, Some(name.clone()))
        }
        (None, _) => run_app(states, settings, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_settings() -> Settings {
        Settings::from_lookup(|key| match key {
            "STATE_FORECAST_API_BASE" => Some("http://from-env".to_string()),
            "STATE_FORECAST_USER_AGENT" => Some("env-agent".to_string()),
            "STATE_FORECAST_TIMEOUT_SECS" => Some("12".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "state_forecast",
            "--api-base",
            "http://from-flag",
            "--timeout-secs",
            "3",
            "--log-file",
            "/tmp/sf.log",
        ])
        .unwrap();
        let mut settings = env_settings();
        cli.apply(&mut settings).unwrap();

        assert_eq!(settings.api_base, "http://from-flag");
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/sf.log")));
        // untouched by flags
        assert_eq!(settings.user_agent, "env-agent");
    }

    #[test]
    fn no_flags_keeps_environment() {
        let cli = Cli::try_parse_from(["state_forecast"]).unwrap();
        let mut settings = env_settings();
        cli.apply(&mut settings).unwrap();
        assert_eq!(settings, env_settings());
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let cli = Cli::try_parse_from(["state_forecast", "--timeout-secs", "0"]).unwrap();
        let err = cli.apply(&mut env_settings()).unwrap_err();
        assert!(err.to_string().contains("--timeout-secs"), "{err}");
    }

    #[test]
    fn print_requires_a_state() {
        assert!(Cli::try_parse_from(["state_forecast", "--print"]).is_err());
        let cli = Cli::try_parse_from(["state_forecast", "--print", "--state", "Utah"]).unwrap();
        assert!(cli.print);
        assert_eq!(cli.state.as_deref(), Some("Utah"));
    }
}
