use clap::Parser;
use std::io::Write;

use st0x_pnl::config::{ReporterConfig, ReporterEnv};
use st0x_pnl::{reporter, setup_tracing};

fn main() -> anyhow::Result<()> {
    let ReporterEnv { config } = ReporterEnv::parse();
    let config = ReporterConfig::load_file(&config)?;
    setup_tracing(&config.log_level());

    let report = reporter::run(&config)?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;

    Ok(())
}
