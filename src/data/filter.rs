use std::collections::BTreeSet;

use super::model::{Listing, ListingTable, NumericColumn, PipelineError};

// ---------------------------------------------------------------------------
// Bounds – inclusive numeric range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Build a range, swapping the ends if they arrive reversed.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Bounds { min: a, max: b }
        } else {
            Bounds { min: b, max: a }
        }
    }

    /// Accepts every present value.
    pub fn unbounded() -> Self {
        Bounds {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// A missing value is never inside any range.
    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if v >= self.min && v <= self.max)
    }

    /// Restrict this range to `extent`, keeping `min <= max`.
    pub fn clamp_within(&self, extent: &Bounds) -> Bounds {
        let min = self.min.clamp(extent.min, extent.max);
        let max = self.max.clamp(extent.min, extent.max);
        Bounds::new(min, max)
    }
}

/// Minimum and maximum of a numeric column, skipping missing values.
pub fn bounds(table: &ListingTable, column: NumericColumn) -> Result<Bounds, PipelineError> {
    table
        .listings
        .iter()
        .filter_map(|l| l.value(column))
        .fold(None, |acc: Option<Bounds>, v| match acc {
            None => Some(Bounds { min: v, max: v }),
            Some(b) => Some(Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
        .ok_or(PipelineError::EmptyRange(column))
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// The user's current selections. Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Empty means "all counties".
    pub selected_counties: BTreeSet<String>,
    pub price_bounds: Bounds,
    pub acres_bounds: Bounds,
}

impl FilterCriteria {
    /// Criteria that only drop rows with a missing price or acreage.
    pub fn full_range(table: &ListingTable) -> Self {
        FilterCriteria {
            selected_counties: BTreeSet::new(),
            price_bounds: bounds(table, NumericColumn::Price).unwrap_or_else(|_| Bounds::unbounded()),
            acres_bounds: bounds(table, NumericColumn::Acres).unwrap_or_else(|_| Bounds::unbounded()),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        (self.selected_counties.is_empty() || self.selected_counties.contains(&listing.county))
            && self.price_bounds.contains(listing.price)
            && self.acres_bounds.contains(listing.acres)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows that survived [`filter`]. Only this type can be display-formatted,
/// so the currency strings never reach a numeric comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredListings(ListingTable);

impl FilteredListings {
    pub fn table(&self) -> &ListingTable {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Return indices of listings that pass every active filter, in table order.
pub fn filtered_indices(table: &ListingTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| criteria.matches(l))
        .map(|(i, _)| i)
        .collect()
}

/// Keep the rows matching `criteria`, preserving their order. No match is an
/// empty result, not an error.
pub fn filter(table: &ListingTable, criteria: &FilterCriteria) -> FilteredListings {
    let kept = filtered_indices(table, criteria)
        .into_iter()
        .map(|i| table.listings[i].clone())
        .collect();
    FilteredListings(table.with_listings(kept))
}
