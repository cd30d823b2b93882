//! Grouped aggregations feeding each chart.
//!
//! Every function here is a pure read over a [`Dataset`]: nothing is cached
//! and calling twice yields identical tables.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use super::filter::{allowed_indices, rated_indices};
use super::model::{AppRecord, Dataset, PriceType};

/// Categories shown by the "top categories" tables.
pub const TOP_CATEGORY_LIMIT: usize = 10;
/// Apps shown by the "most installed apps" table.
pub const TOP_APPS_LIMIT: usize = 10;
/// Cap on (category, price type) groups in the per-type rating table.
pub const CATEGORY_TYPE_GROUP_LIMIT: usize = 25;
/// Categories, in key order, shown by the mean rating chart.
pub const CATEGORY_MEAN_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{operation}: no qualifying rows to aggregate")]
    EmptyDataset { operation: &'static str },
}

// ---------------------------------------------------------------------------
// Derived table entries
// ---------------------------------------------------------------------------

/// Mean rating of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingMean {
    pub category: String,
    /// Unrounded mean, for tooltips.
    pub mean: f64,
    /// Mean rounded to one decimal place, for display.
    pub display: f64,
    /// Rows that entered the mean.
    pub rated_apps: usize,
}

/// Mean rating of one (category, price type) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedRatingMean {
    pub category: String,
    pub price_type: PriceType,
    pub mean: f64,
    pub display: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeVsPaid {
    pub free_count: usize,
    pub paid_count: usize,
    pub free_percentage: f64,
    pub paid_percentage: f64,
}

/// Round half-to-even at one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

// ---------------------------------------------------------------------------
// Category tables
// ---------------------------------------------------------------------------

/// App count per category, the ten largest, descending.
///
/// Equal counts keep the order in which their categories first appear.
pub fn category_counts(dataset: &Dataset) -> Vec<(String, usize)> {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for rec in dataset.records() {
        *seen.entry(rec.category.as_str()).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = seen
        .into_iter()
        .map(|(cat, n)| (cat.to_string(), n))
        .collect();
    // sort_by is stable, so first-seen order survives among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_CATEGORY_LIMIT);
    counts
}

/// Sum of ratings per category. Unrated apps add zero.
pub fn category_rating_sum(dataset: &Dataset) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for rec in dataset.records() {
        *sums.entry(rec.category.clone()).or_insert(0.0) += rec.rating;
    }
    sums
}

/// Mean rating per category, in category order.
///
/// With `exclude_unrated` the `0.0` sentinel is left out of both the sum and
/// the count, so a category holding one unrated app and one rated 4.0 means
/// 4.0.
pub fn category_rating_mean(
    dataset: &Dataset,
    exclude_unrated: bool,
) -> Result<Vec<RatingMean>, PipelineError> {
    let indices: Vec<usize> = if exclude_unrated {
        rated_indices(dataset)
    } else {
        (0..dataset.len()).collect()
    };
    if indices.is_empty() {
        return Err(PipelineError::EmptyDataset {
            operation: "category_rating_mean",
        });
    }

    let records = dataset.records();
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for idx in indices {
        let rec = &records[idx];
        let entry = groups.entry(rec.category.as_str()).or_insert((0.0, 0));
        entry.0 += rec.rating;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .map(|(category, (sum, n))| {
            let mean = sum / n as f64;
            RatingMean {
                category: category.to_string(),
                mean,
                display: round1(mean),
                rated_apps: n,
            }
        })
        .collect())
}

/// Total average installs per category, the ten largest, descending.
pub fn total_installs_per_category(dataset: &Dataset) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in dataset.records() {
        *sums.entry(rec.category.as_str()).or_insert(0.0) += rec.average_installs();
    }
    let mut totals: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(cat, total)| (cat.to_string(), total))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.truncate(TOP_CATEGORY_LIMIT);
    totals
}

// ---------------------------------------------------------------------------
// App tables
// ---------------------------------------------------------------------------

/// The `n` apps with the most average installs, descending.
///
/// Apps with equal installs keep their input order.
pub fn top_n_by_installs(dataset: &Dataset, n: usize) -> Vec<&AppRecord> {
    let mut ranked: Vec<&AppRecord> = dataset.records().iter().collect();
    ranked.sort_by(|a, b| b.average_installs().total_cmp(&a.average_installs()));
    ranked.truncate(n);
    ranked
}

/// Most installed app of each allowed category.
///
/// Categories without any app are simply absent. On equal installs the
/// first app in input order wins.
pub fn most_installed_per_allowed_category<'a>(
    dataset: &'a Dataset,
    allowed: &[&str],
) -> BTreeMap<String, &'a AppRecord> {
    let records = dataset.records();
    let mut leaders: BTreeMap<String, &AppRecord> = BTreeMap::new();
    for idx in allowed_indices(dataset, allowed) {
        let rec = &records[idx];
        match leaders.get_mut(&rec.category) {
            Some(best) => {
                if rec.average_installs() > best.average_installs() {
                    *best = rec;
                }
            }
            None => {
                leaders.insert(rec.category.clone(), rec);
            }
        }
    }
    leaders
}

// ---------------------------------------------------------------------------
// Pricing and content rating
// ---------------------------------------------------------------------------

/// Free and paid app counts with their share of the catalog.
pub fn free_vs_paid_counts(dataset: &Dataset) -> Result<FreeVsPaid, PipelineError> {
    let total = dataset.len();
    if total == 0 {
        return Err(PipelineError::EmptyDataset {
            operation: "free_vs_paid_counts",
        });
    }
    let free_count = dataset.records().iter().filter(|r| r.is_free).count();
    let paid_count = total - free_count;
    let share = |count: usize| round1(count as f64 / total as f64 * 100.0);

    Ok(FreeVsPaid {
        free_count,
        paid_count,
        free_percentage: share(free_count),
        paid_percentage: share(paid_count),
    })
}

/// App count per content rating. Key order only; see [`sorted_by_count_desc`].
pub fn content_rating_counts(dataset: &Dataset) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for rec in dataset.records() {
        *counts.entry(rec.content_rating.clone()).or_insert(0) += 1;
    }
    counts
}

/// Flatten a count table into display order: descending count, then key.
pub fn sorted_by_count_desc(counts: &BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Mean rating per (category, price type), unrated apps excluded.
///
/// Groups come in key order (category, then paid before free) and only the
/// first [`CATEGORY_TYPE_GROUP_LIMIT`] are returned.
pub fn average_rating_by_category_and_type(
    dataset: &Dataset,
) -> Result<Vec<TypedRatingMean>, PipelineError> {
    let indices = rated_indices(dataset);
    if indices.is_empty() {
        return Err(PipelineError::EmptyDataset {
            operation: "average_rating_by_category_and_type",
        });
    }

    let records = dataset.records();
    let mut groups: BTreeMap<(&str, PriceType), (f64, usize)> = BTreeMap::new();
    for idx in indices {
        let rec = &records[idx];
        let key = (rec.category.as_str(), PriceType::from_free(rec.is_free));
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += rec.rating;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .take(CATEGORY_TYPE_GROUP_LIMIT)
        .map(|((category, price_type), (sum, n))| {
            let mean = sum / n as f64;
            TypedRatingMean {
                category: category.to_string(),
                price_type,
                mean,
                display: round1(mean),
            }
        })
        .collect())
}
