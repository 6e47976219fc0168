//! Batch P&L reporter: loads events and market data from disk, runs the
//! accounting engine once and hands back the report.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ReporterConfig;
use crate::event::Event;
use crate::market::{MarketSnapshot, Quote};
use crate::portfolio::PortfolioReport;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_events(path: &Path) -> Result<Vec<Event>, InputError> {
    read_json(path)
}

pub fn load_market(path: &Path) -> Result<MarketSnapshot, InputError> {
    let quotes: Vec<Quote> = read_json(path)?;
    Ok(quotes.into_iter().collect())
}

pub fn run(config: &ReporterConfig) -> anyhow::Result<PortfolioReport> {
    let events = load_events(config.events_path())?;
    info!(
        path = %config.events_path().display(),
        count = events.len(),
        "Loaded events"
    );

    let market = match config.market_path() {
        Some(path) => {
            let market = load_market(path)?;
            info!(path = %path.display(), quotes = market.len(), "Loaded market snapshot");
            market
        }
        None => {
            info!("No market snapshot configured, open positions are valued at zero");
            MarketSnapshot::new()
        }
    };

    Ok(PortfolioReport::compute(events, &market)?)
}
