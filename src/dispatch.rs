//! Visualization menu and the render instructions each entry produces.
//!
//! [`render_instructions`] is the only bridge between a sidebar selection and
//! the aggregation layer: one selection, one call, one list of [`ChartSpec`]s.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::data::aggregate::{self, PipelineError, CATEGORY_MEAN_LIMIT, TOP_APPS_LIMIT};
use crate::data::filter::GAME_CATEGORIES;
use crate::data::model::{Dataset, PriceType};

const BILLION: f64 = 1_000_000_000.0;

// ---------------------------------------------------------------------------
// Visualization – the fixed menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visualization {
    #[default]
    HighestRatedCategory,
    TopInstalledApps,
    AppsPerCategory,
    GameInstallLeaders,
    FreeVsPaid,
    ContentRating,
}

impl Visualization {
    pub const ALL: [Visualization; 6] = [
        Visualization::HighestRatedCategory,
        Visualization::TopInstalledApps,
        Visualization::AppsPerCategory,
        Visualization::GameInstallLeaders,
        Visualization::FreeVsPaid,
        Visualization::ContentRating,
    ];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Visualization::HighestRatedCategory => "Viz 1: Highest Rated Category",
            Visualization::TopInstalledApps => "Viz 2: Top 10 most installed Apps",
            Visualization::AppsPerCategory => "Viz 3: Total Playstore Apps per Category",
            Visualization::GameInstallLeaders => "Viz 4: Total installs for each category",
            Visualization::FreeVsPaid => "Viz 5: Free vs Paid Apps",
            Visualization::ContentRating => "Viz 6: Content Rating",
        }
    }

    /// Command-line name.
    pub fn slug(self) -> &'static str {
        match self {
            Visualization::HighestRatedCategory => "highest-rated-category",
            Visualization::TopInstalledApps => "top-installed-apps",
            Visualization::AppsPerCategory => "apps-per-category",
            Visualization::GameInstallLeaders => "game-install-leaders",
            Visualization::FreeVsPaid => "free-vs-paid",
            Visualization::ContentRating => "content-rating",
        }
    }
}

impl fmt::Display for Visualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown visualization '{0}'")]
pub struct UnknownVisualization(pub String);

impl FromStr for Visualization {
    type Err = UnknownVisualization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visualization::ALL
            .into_iter()
            .find(|v| v.slug() == s)
            .ok_or_else(|| UnknownVisualization(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ChartSpec – what the renderer draws
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    /// Pie slices sized by value.
    Arc,
    /// Bars with a text label drawn next to each one.
    LayeredBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Named colour scales, after the Vega schemes of the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorScheme {
    LightMulti,
    Teals,
    LightTealBlue,
    LightGreyTeal,
    Category10,
    RedYellowGreen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub label: String,
    pub value: f64,
    pub tooltip: String,
    /// Text drawn next to the mark (layered charts).
    pub annotation: Option<String>,
}

impl ChartEntry {
    fn new(label: impl Into<String>, value: f64, tooltip: String) -> Self {
        ChartEntry {
            label: label.into(),
            value,
            tooltip,
            annotation: None,
        }
    }

    fn annotated(mut self, text: impl Into<String>) -> Self {
        self.annotation = Some(text.into());
        self
    }
}

/// A single chart, ready to draw. Entries are in reading order
/// (top to bottom for horizontal bars, left to right for vertical ones).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub orientation: Orientation,
    pub category_axis: String,
    pub value_axis: String,
    pub scheme: ColorScheme,
    pub entries: Vec<ChartEntry>,
}

impl ChartSpec {
    fn bar(title: &str, orientation: Orientation, axes: (&str, &str), scheme: ColorScheme) -> Self {
        ChartSpec {
            title: title.to_string(),
            kind: ChartKind::Bar,
            orientation,
            category_axis: axes.0.to_string(),
            value_axis: axes.1.to_string(),
            scheme,
            entries: Vec::new(),
        }
    }

    fn kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    fn entries(mut self, entries: Vec<ChartEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Largest entry value, `0.0` for an empty chart.
    pub fn max_value(&self) -> f64 {
        self.entries.iter().map(|e| e.value).fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Compute the charts for one visualization.
pub fn render_instructions(
    viz: Visualization,
    dataset: &Dataset,
) -> Result<Vec<ChartSpec>, PipelineError> {
    log::debug!("building '{}' over {} apps", viz.slug(), dataset.len());
    match viz {
        Visualization::HighestRatedCategory => highest_rated_category(dataset),
        Visualization::TopInstalledApps => Ok(vec![top_installed_apps(dataset)]),
        Visualization::AppsPerCategory => Ok(apps_per_category(dataset)),
        Visualization::GameInstallLeaders => Ok(vec![game_install_leaders(dataset)]),
        Visualization::FreeVsPaid => Ok(vec![free_vs_paid(dataset)?]),
        Visualization::ContentRating => Ok(vec![content_rating(dataset)]),
    }
}

fn ascending(entries: &mut [ChartEntry]) {
    entries.sort_by(|a, b| a.value.total_cmp(&b.value));
}

fn descending(entries: &mut [ChartEntry]) {
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
}

fn highest_rated_category(dataset: &Dataset) -> Result<Vec<ChartSpec>, PipelineError> {
    let mut sums: Vec<ChartEntry> = aggregate::category_rating_sum(dataset)
        .into_iter()
        .map(|(cat, sum)| {
            let tooltip = format!("{cat}: {sum:.1}");
            ChartEntry::new(cat, sum, tooltip)
        })
        .collect();
    ascending(&mut sums);

    let mut means: Vec<ChartEntry> = aggregate::category_rating_mean(dataset, true)?
        .into_iter()
        .take(CATEGORY_MEAN_LIMIT)
        .map(|m| {
            let tooltip = format!("{}: {} ({} rated apps)", m.category, m.mean, m.rated_apps);
            ChartEntry::new(m.category, m.display, tooltip)
        })
        .collect();
    descending(&mut means);

    let by_type: Vec<ChartEntry> = aggregate::average_rating_by_category_and_type(dataset)?
        .into_iter()
        .map(|m| {
            let label = format!("{} ({})", m.category, m.price_type);
            let tooltip = format!("{label}: {}", m.mean);
            ChartEntry::new(label, m.display, tooltip)
        })
        .collect();

    Ok(vec![
        ChartSpec::bar(
            "app category vs rating",
            Orientation::Horizontal,
            ("Category", "Rating"),
            ColorScheme::LightMulti,
        )
        .entries(sums),
        ChartSpec::bar(
            "app category vs average rating",
            Orientation::Vertical,
            ("Category", "Rating"),
            ColorScheme::LightMulti,
        )
        .entries(means),
        ChartSpec::bar(
            "average rating by category and price",
            Orientation::Vertical,
            ("Category (Type)", "Rating"),
            ColorScheme::LightMulti,
        )
        .entries(by_type),
    ])
}

fn top_installed_apps(dataset: &Dataset) -> ChartSpec {
    let mut entries: Vec<ChartEntry> = aggregate::top_n_by_installs(dataset, TOP_APPS_LIMIT)
        .into_iter()
        .map(|rec| {
            let billions = rec.average_installs() / BILLION;
            let tooltip = format!("{}: {billions} billion installs", rec.name);
            ChartEntry::new(rec.name.clone(), billions, tooltip)
        })
        .collect();
    ascending(&mut entries);

    ChartSpec::bar(
        "Top 10 most installed Apps",
        Orientation::Horizontal,
        ("App Name", "Average Installs (Billions)"),
        ColorScheme::Teals,
    )
    .entries(entries)
}

fn apps_per_category(dataset: &Dataset) -> Vec<ChartSpec> {
    let mut counts: Vec<ChartEntry> = aggregate::category_counts(dataset)
        .into_iter()
        .map(|(cat, n)| {
            let tooltip = format!("{cat}: {n}");
            ChartEntry::new(cat, n as f64, tooltip)
        })
        .collect();
    ascending(&mut counts);

    let mut installs: Vec<ChartEntry> = aggregate::total_installs_per_category(dataset)
        .into_iter()
        .map(|(cat, total)| {
            let tooltip = format!("{cat}: {total:.0}");
            ChartEntry::new(cat, total, tooltip)
        })
        .collect();
    ascending(&mut installs);

    vec![
        ChartSpec::bar(
            "Total Playstore Apps per Category",
            Orientation::Horizontal,
            ("Category", "Total Count"),
            ColorScheme::LightTealBlue,
        )
        .entries(counts),
        ChartSpec::bar(
            "Total installs for each category",
            Orientation::Horizontal,
            ("Category", "Average Installs"),
            ColorScheme::LightGreyTeal,
        )
        .entries(installs),
    ]
}

fn game_install_leaders(dataset: &Dataset) -> ChartSpec {
    let mut entries: Vec<ChartEntry> =
        aggregate::most_installed_per_allowed_category(dataset, GAME_CATEGORIES)
            .into_iter()
            .map(|(cat, rec)| {
                let billions = rec.average_installs() / BILLION;
                let tooltip = format!("{cat}: {} ({billions} billion installs)", rec.name);
                ChartEntry::new(cat, billions, tooltip).annotated(rec.name.clone())
            })
            .collect();
    ascending(&mut entries);

    ChartSpec::bar(
        "Total installs for each category",
        Orientation::Horizontal,
        ("Category", "Average Installs (Billions)"),
        ColorScheme::Category10,
    )
    .kind(ChartKind::LayeredBar)
    .entries(entries)
}

fn free_vs_paid(dataset: &Dataset) -> Result<ChartSpec, PipelineError> {
    let split = aggregate::free_vs_paid_counts(dataset)?;
    let mut entries = vec![
        ChartEntry::new(
            PriceType::Free.label(),
            split.free_count as f64,
            format!("{}: {}%", PriceType::Free, split.free_percentage),
        ),
        ChartEntry::new(
            PriceType::Paid.label(),
            split.paid_count as f64,
            format!("{}: {}%", PriceType::Paid, split.paid_percentage),
        ),
    ];
    descending(&mut entries);

    Ok(ChartSpec::bar(
        "Free vs Paid Apps",
        Orientation::Vertical,
        ("Category", "Count"),
        ColorScheme::Category10,
    )
    .kind(ChartKind::Arc)
    .entries(entries))
}

fn content_rating(dataset: &Dataset) -> ChartSpec {
    let counts = aggregate::content_rating_counts(dataset);
    let entries: Vec<ChartEntry> = aggregate::sorted_by_count_desc(&counts)
        .into_iter()
        .map(|(rating, n)| {
            let tooltip = format!("{rating}: {n}");
            ChartEntry::new(rating, n as f64, tooltip).annotated(n.to_string())
        })
        .collect();

    ChartSpec::bar(
        "Content Rating",
        Orientation::Vertical,
        ("Content Rating", "Number of Apps"),
        ColorScheme::RedYellowGreen,
    )
    .kind(ChartKind::LayeredBar)
    .entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AppRecord;

    fn catalog() -> Dataset {
        let rec = |name: &str, cat: &str, rating: f64, installs: u64, free: bool, content: &str| {
            AppRecord::new(name, cat, rating, installs, installs, free, content).unwrap()
        };
        Dataset::from_records(vec![
            rec("Clash", "Strategy", 4.5, 500_000_000, true, "Everyone 10+"),
            rec("Chess Pro", "Strategy", 4.9, 1_000_000, false, "Everyone"),
            rec("Gmail", "Communication", 4.2, 10_000_000_000, true, "Everyone"),
            rec("Sudoku", "Puzzle", 0.0, 5_000_000, true, "Everyone"),
            rec("Notes", "Productivity", 3.9, 50_000, false, "Teen"),
        ])
    }

    #[test]
    fn slugs_round_trip_through_from_str() {
        for viz in Visualization::ALL {
            assert_eq!(viz.slug().parse::<Visualization>().unwrap(), viz);
        }
        assert!("viz-7".parse::<Visualization>().is_err());
    }

    #[test]
    fn highest_rated_category_builds_three_charts() {
        let charts = render_instructions(Visualization::HighestRatedCategory, &catalog()).unwrap();
        assert_eq!(charts.len(), 3);

        let sums = &charts[0];
        assert_eq!(sums.orientation, Orientation::Horizontal);
        assert_eq!(sums.entries.first().unwrap().label, "Puzzle");
        assert_eq!(sums.entries.last().unwrap().label, "Strategy");

        let means = &charts[1];
        assert!(means.entries.iter().all(|e| e.label != "Puzzle"));
        assert_eq!(means.entries[0].label, "Strategy");
        assert_eq!(means.entries[0].value, 4.7);
    }

    #[test]
    fn mean_chart_keeps_the_first_categories_in_key_order() {
        let ds = Dataset::from_records(
            (0..30)
                .map(|i| {
                    let rating = 1.0 + i as f64 / 10.0;
                    AppRecord::new("a", format!("Cat{i:02}"), rating, 1, 1, true, "Everyone").unwrap()
                })
                .collect(),
        );
        let charts = render_instructions(Visualization::HighestRatedCategory, &ds).unwrap();

        let means = &charts[1];
        assert_eq!(means.entries.len(), CATEGORY_MEAN_LIMIT);
        assert_eq!(means.entries[0].label, "Cat24");
        assert!(means.entries.iter().all(|e| e.label.as_str() < "Cat25"));
        assert_eq!(charts[0].entries.len(), 30);
    }

    #[test]
    fn game_leaders_skip_non_game_categories() {
        let charts = render_instructions(Visualization::GameInstallLeaders, &catalog()).unwrap();
        let chart = &charts[0];
        assert_eq!(chart.kind, ChartKind::LayeredBar);
        assert_eq!(chart.title, "Total installs for each category");

        let labels: Vec<&str> = chart.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Puzzle", "Strategy"]);
        assert_eq!(chart.entries[1].annotation.as_deref(), Some("Clash"));
        assert_eq!(chart.entries[1].value, 0.5);
    }

    #[test]
    fn top_installed_apps_in_billions() {
        let charts = render_instructions(Visualization::TopInstalledApps, &catalog()).unwrap();
        let last = charts[0].entries.last().unwrap();
        assert_eq!(last.label, "Gmail");
        assert_eq!(last.value, 10.0);
        assert_eq!(charts[0].entries.len(), 5);
    }

    #[test]
    fn free_vs_paid_is_an_arc_chart() {
        let charts = render_instructions(Visualization::FreeVsPaid, &catalog()).unwrap();
        let chart = &charts[0];
        assert_eq!(chart.kind, ChartKind::Arc);
        assert_eq!(chart.entries[0].label, "Free");
        assert_eq!(chart.entries[0].tooltip, "Free: 60%");
        assert_eq!(chart.entries[1].tooltip, "Paid: 40%");
    }

    #[test]
    fn empty_dataset_surfaces_the_error() {
        let empty = Dataset::default();
        assert!(render_instructions(Visualization::FreeVsPaid, &empty).is_err());
        assert!(render_instructions(Visualization::HighestRatedCategory, &empty).is_err());

        let counts = render_instructions(Visualization::ContentRating, &empty).unwrap();
        assert!(counts[0].entries.is_empty());
        assert_eq!(counts[0].max_value(), 0.0);
    }

    #[test]
    fn content_rating_annotates_counts() {
        let charts = render_instructions(Visualization::ContentRating, &catalog()).unwrap();
        let first = &charts[0].entries[0];
        assert_eq!(first.label, "Everyone");
        assert_eq!(first.annotation.as_deref(), Some("3"));
    }

    #[test]
    fn every_visualization_serializes() {
        let ds = catalog();
        for viz in Visualization::ALL {
            let charts = render_instructions(viz, &ds).unwrap();
            let json = serde_json::to_string(&charts).unwrap();
            assert!(json.contains("\"entries\""));
        }
    }
}
