use std::fmt;

use thiserror::Error;

/// Header names the dashboard relies on. Matching is exact, as in the CSV.
pub const COUNTY: &str = "County";
pub const PRICE: &str = "Price";
pub const ACRES: &str = "Acres";
pub const URL: &str = "URL";

// ---------------------------------------------------------------------------
// Errors raised by the pipeline
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("required column '{0}' is missing from the listings file")]
    MissingColumn(&'static str),
    #[error("no {0} values available")]
    EmptyRange(NumericColumn),
}

// ---------------------------------------------------------------------------
// RawTable – the CSV exactly as loaded
// ---------------------------------------------------------------------------

/// Header plus string cells, untouched apart from CSV decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// Listing – one normalized row
// ---------------------------------------------------------------------------

/// The two columns that take part in range filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Price,
    Acres,
}

impl NumericColumn {
    pub fn header(self) -> &'static str {
        match self {
            NumericColumn::Price => PRICE,
            NumericColumn::Acres => ACRES,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// A single property listing. `None` in a numeric field means the source
/// cell could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub county: String,
    pub price: Option<f64>,
    pub acres: Option<f64>,
    pub url: String,
    /// Pass-through cells, indexed by [`Slot::Extra`].
    pub extra: Vec<String>,
}

impl Listing {
    pub fn value(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Price => self.price,
            NumericColumn::Acres => self.acres,
        }
    }
}

// ---------------------------------------------------------------------------
// ListingTable – the normalized dataset
// ---------------------------------------------------------------------------

/// Where each cell of a source row ends up in a [`Listing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    County,
    Price,
    Acres,
    Url,
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingTable {
    /// Source header order, used for display.
    pub columns: Vec<String>,
    /// One slot per entry in `columns`.
    pub layout: Vec<Slot>,
    pub listings: Vec<Listing>,
}

impl ListingTable {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Distinct counties in order of first appearance.
    pub fn counties(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.listings
            .iter()
            .filter(|l| seen.insert(l.county.as_str()))
            .map(|l| l.county.clone())
            .collect()
    }

    /// Same rows, new listing set. Keeps the header layout.
    pub fn with_listings(&self, listings: Vec<Listing>) -> Self {
        ListingTable {
            columns: self.columns.clone(),
            layout: self.layout.clone(),
            listings,
        }
    }

    /// Write the table back out as strings. Numbers use their shortest
    /// round-trip form and missing values become empty cells.
    pub fn to_raw(&self) -> RawTable {
        let rows = self
            .listings
            .iter()
            .map(|l| {
                self.layout
                    .iter()
                    .map(|slot| match slot {
                        Slot::County => l.county.clone(),
                        Slot::Price => number_cell(l.price),
                        Slot::Acres => number_cell(l.acres),
                        Slot::Url => l.url.clone(),
                        Slot::Extra(i) => l.extra.get(*i).cloned().unwrap_or_default(),
                    })
                    .collect()
            })
            .collect();

        RawTable {
            headers: self.columns.clone(),
            rows,
        }
    }
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
