use super::model::Dataset;

// ---------------------------------------------------------------------------
// Category allowlists
// ---------------------------------------------------------------------------

/// Store categories treated as games for the install-leader chart.
pub const GAME_CATEGORIES: &[&str] = &[
    "Strategy",
    "Adventure",
    "Word",
    "Puzzle",
    "Simulation",
    "Role Playing",
    "Action",
    "Casual",
    "Racing",
    "Sports",
    "Arcade",
    "Card",
    "Music",
    "Trivia",
];

// ---------------------------------------------------------------------------
// Row selections
// ---------------------------------------------------------------------------

/// Return indices of apps whose category is in `allowed`, in input order.
///
/// An empty allowlist selects nothing.
pub fn allowed_indices(dataset: &Dataset, allowed: &[&str]) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| allowed.contains(&rec.category.as_str()))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of apps that carry a real rating (`rating > 0`).
pub fn rated_indices(dataset: &Dataset) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| rec.is_rated())
        .map(|(i, _)| i)
        .collect()
}
