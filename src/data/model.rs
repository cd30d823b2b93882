use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// AppRecord – one row of the catalog
// ---------------------------------------------------------------------------

/// A single app (one cleaned row of the source table).
///
/// Fields are validated once by the loader; `average_installs` is derived at
/// construction and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRecord {
    pub name: String,
    pub category: String,
    /// Store rating. `0.0` marks an unrated app, not a real score of zero.
    pub rating: f64,
    pub min_installs: u64,
    pub max_installs: u64,
    pub is_free: bool,
    pub content_rating: String,
    average_installs: f64,
}

impl AppRecord {
    /// Build a record. `None` for an inverted install range or a non-finite rating.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        rating: f64,
        min_installs: u64,
        max_installs: u64,
        is_free: bool,
        content_rating: impl Into<String>,
    ) -> Option<Self> {
        if min_installs > max_installs || !rating.is_finite() {
            return None;
        }
        Some(AppRecord {
            name: name.into(),
            category: category.into(),
            rating,
            min_installs,
            max_installs,
            is_free,
            content_rating: content_rating.into(),
            average_installs: (min_installs as f64 + max_installs as f64) / 2.0,
        })
    }

    /// Midpoint of the reported install range.
    pub fn average_installs(&self) -> f64 {
        self.average_installs
    }

    /// Whether the app carries a real rating (the `0.0` sentinel excluded).
    pub fn is_rated(&self) -> bool {
        self.rating > 0.0
    }
}

// ---------------------------------------------------------------------------
// PriceType
// ---------------------------------------------------------------------------

/// Pricing split used by the free/paid and per-type rating tables.
/// `Paid` orders before `Free`, matching `false < true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PriceType {
    Paid,
    Free,
}

impl PriceType {
    pub fn from_free(is_free: bool) -> Self {
        if is_free {
            PriceType::Free
        } else {
            PriceType::Paid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceType::Free => "Free",
            PriceType::Paid => "Paid",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned catalog
// ---------------------------------------------------------------------------

/// The cleaned catalog with its category index. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<AppRecord>,
    /// Distinct categories in first-seen order.
    categories: Vec<String>,
    /// Source rows rejected during cleaning.
    dropped_rows: usize,
}

impl Dataset {
    pub fn from_records(records: Vec<AppRecord>) -> Self {
        Self::with_dropped(records, 0)
    }

    /// Build a dataset and remember how many source rows were discarded.
    pub fn with_dropped(records: Vec<AppRecord>, dropped_rows: usize) -> Self {
        let categories = {
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            records
                .iter()
                .filter(|rec| seen.insert(rec.category.as_str()))
                .map(|rec| rec.category.clone())
                .collect()
        };
        Dataset {
            records,
            categories,
            dropped_rows,
        }
    }

    pub fn records(&self) -> &[AppRecord] {
        &self.records
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Number of apps.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_installs_is_range_midpoint() {
        let rec = AppRecord::new("Maps", "Tools", 4.2, 100, 300, true, "Everyone").unwrap();
        assert_eq!(rec.average_installs(), 200.0);

        let odd = AppRecord::new("Odd", "Tools", 4.2, 1, 2, true, "Everyone").unwrap();
        assert_eq!(odd.average_installs(), 1.5);
    }

    #[test]
    fn inverted_install_range_is_rejected() {
        assert!(AppRecord::new("Bad", "Tools", 3.0, 500, 10, false, "Everyone").is_none());
        assert!(AppRecord::new("Nan", "Tools", f64::NAN, 1, 10, false, "Everyone").is_none());
    }

    #[test]
    fn zero_rating_means_unrated() {
        let unrated = AppRecord::new("New", "Word", 0.0, 0, 5, true, "Everyone").unwrap();
        assert!(!unrated.is_rated());
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let rec = |cat: &str| AppRecord::new("a", cat, 1.0, 0, 0, true, "Everyone").unwrap();
        let ds = Dataset::from_records(vec![rec("Tools"), rec("Card"), rec("Tools"), rec("Action")]);
        assert_eq!(ds.categories(), vec!["Tools", "Card", "Action"]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.dropped_rows(), 0);
    }

    #[test]
    fn paid_orders_before_free() {
        assert!(PriceType::Paid < PriceType::Free);
        assert_eq!(PriceType::from_free(false).to_string(), "Paid");
    }
}
