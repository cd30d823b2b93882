mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::PlaystoreDashApp;
use clap::Parser;
use eframe::egui;
use playstore_dash::data::loader;

/// Interactive charts over a Google Play Store app catalog.
#[derive(Debug, Parser)]
#[command(name = "playstore-dash", version)]
struct Args {
    /// Catalog file (.csv, .json or .parquet). Open one from the File menu when omitted.
    #[arg(short, long, env = "PLAYSTORE_DATASET")]
    dataset: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut app = PlaystoreDashApp::default();
    if let Some(path) = args.dataset {
        // A configured catalog that cannot be read stops startup.
        let dataset = loader::load_file(&path)?;
        app.state.set_dataset(dataset, path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Play Store Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with an error: {e}"))
}
