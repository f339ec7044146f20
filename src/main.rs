mod analysis;
mod app;
mod cli;
mod color;
mod data;
mod error;
mod report;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();
    log::info!("Running with {}", serde_json::to_string(&config)?);

    let analysis = analysis::run(&config)
        .with_context(|| format!("analysing {}", config.input.display()))?;

    println!("{}", report::render(&analysis, cli.format)?);

    if !cli.no_plots {
        app::launch(analysis).map_err(|e| {
            log::error!("Chart window failed: {e}");
            anyhow::anyhow!("cannot open the chart window ({e}); rerun with --no-plots")
        })?;
    }

    Ok(())
}
