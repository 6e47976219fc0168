//! Reporter configuration, loaded from a plaintext TOML file.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ReporterEnv {
    /// Path to TOML configuration file
    #[clap(long, env = "REPORTER_CONFIG")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterConfig {
    log_level: Option<LogLevel>,
    /// JSON array of acquisition and disposal events.
    events: PathBuf,
    /// JSON array of current prices and balances. Tokens without a quote
    /// are valued at zero.
    market: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
}

impl ReporterConfig {
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path)?;
        Self::load(&config_str)
    }

    pub fn load(config_toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config_toml)?)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.clone().unwrap_or(LogLevel::Info)
    }

    pub fn events_path(&self) -> &Path {
        &self.events
    }

    pub fn market_path(&self) -> Option<&Path> {
        self.market.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        (&log_level).into()
    }
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

pub fn setup_tracing(log_level: &LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!("st0x_pnl={level},reporter={level}");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
