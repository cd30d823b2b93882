use std::path::PathBuf;

use playstore_dash::data::model::Dataset;
use playstore_dash::dispatch::{render_instructions, ChartSpec, Visualization};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded catalog (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Where the catalog came from.
    pub source: Option<PathBuf>,

    /// Visualization picked in the sidebar.
    pub selection: Visualization,

    /// Charts for the current selection (rebuilt only when it changes).
    pub charts: Vec<ChartSpec>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset and rebuild the current selection.
    pub fn set_dataset(&mut self, dataset: Dataset, source: PathBuf) {
        self.dataset = Some(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.rebuild();
    }

    /// Switch visualization. Re-selecting the current one does nothing.
    pub fn select(&mut self, viz: Visualization) {
        if viz == self.selection && !self.charts.is_empty() {
            return;
        }
        self.selection = viz;
        self.rebuild();
    }

    /// Recompute `charts` for the current selection.
    fn rebuild(&mut self) {
        let Some(ds) = &self.dataset else {
            self.charts.clear();
            return;
        };
        match render_instructions(self.selection, ds) {
            Ok(charts) => {
                self.charts = charts;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("{}: {e}", self.selection.slug());
                self.charts.clear();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
