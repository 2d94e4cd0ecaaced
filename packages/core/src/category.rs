//! The fixed set of output classes the trained classifier knows about.

/// Output categories in model index order.
///
/// The decision model emits one raw score per category and index `i` of that
/// score vector belongs to `CATEGORIES[i]`. Artifact loading rejects any
/// model whose class cardinality differs, so the mapping holds for every
/// loaded artifact set.
pub const CATEGORIES: [&str; 5] = ["Stress", "Depression", "Bipolar", "Personality", "Anxiety"];

/// Resolve a class index to its category name.
pub fn name_of(index: usize) -> Option<&'static str> {
    CATEGORIES.get(index).copied()
}
