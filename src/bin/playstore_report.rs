use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playstore_dash::data::loader;
use playstore_dash::dispatch::{render_instructions, ChartSpec, Visualization};

/// Print the chart instructions for a catalog as JSON.
#[derive(Debug, Parser)]
#[command(name = "playstore-report", version)]
struct Args {
    /// Catalog file (.csv, .json or .parquet).
    #[arg(short, long, env = "PLAYSTORE_DATASET")]
    dataset: PathBuf,

    /// Visualization to build (e.g. `free-vs-paid`). All of them when omitted.
    #[arg(long)]
    viz: Option<Visualization>,

    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = loader::load_file(&args.dataset)?;

    let selected: Vec<Visualization> = match args.viz {
        Some(viz) => vec![viz],
        None => Visualization::ALL.to_vec(),
    };

    let mut charts: Vec<ChartSpec> = Vec::new();
    for viz in selected {
        let built = render_instructions(viz, &dataset)
            .with_context(|| format!("building '{}'", viz.slug()))?;
        charts.extend(built);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&charts)?
    } else {
        serde_json::to_string(&charts)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("writing report")?;
    Ok(())
}
