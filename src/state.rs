use std::collections::BTreeSet;

use crate::data::filter::{bounds, filter, Bounds, FilterCriteria};
use crate::data::format::{format_for_display, DisplayTable};
use crate::data::loader::{DataSource, ListingCache};
use crate::data::model::{ListingTable, NumericColumn};
use crate::data::normalize::normalize;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel should show.
#[derive(Debug, PartialEq)]
pub enum View<'a> {
    /// Load or schema failure; nothing else is shown.
    Error(&'a str),
    /// Loaded table had no rows.
    NoData,
    Listings(&'a DisplayTable),
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Owns the memoized raw table. `None` when no source is configured.
    cache: Option<ListingCache>,

    /// Normalized listings of the current cache epoch.
    pub listings: Option<ListingTable>,

    /// Distinct counties, first-appearance order.
    pub counties: Vec<String>,

    /// Extents derived at load time. `None` means the column has no values.
    pub price_extent: Option<Bounds>,
    pub acres_extent: Option<Bounds>,

    /// Current selections.
    pub selected_counties: BTreeSet<String>,
    pub price_range: Option<Bounds>,
    pub acres_range: Option<Bounds>,

    /// Filtered, display-formatted rows (cached until the next refilter).
    pub display: Option<DisplayTable>,

    /// Blocking error shown instead of the table.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            cache: Some(ListingCache::new(source)),
            ..Default::default()
        }
    }

    /// State for when no source could be configured.
    pub fn unconfigured(reason: String) -> Self {
        Self {
            status_message: Some(reason),
            ..Default::default()
        }
    }

    pub fn source_description(&self) -> Option<String> {
        self.cache.as_ref().map(ListingCache::describe)
    }

    /// Swap in a new source and load it.
    pub fn set_source(&mut self, source: Box<dyn DataSource>) {
        self.cache = Some(ListingCache::new(source));
        self.reload();
    }

    /// Drop the cached table and fetch again.
    pub fn refresh(&mut self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
        self.reload();
    }

    /// Load through the cache (fetching only if it was invalidated) and
    /// rebuild everything downstream.
    pub fn reload(&mut self) {
        let Some(cache) = &self.cache else {
            return;
        };

        let raw = match cache.load() {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to load listings: {e}");
                self.clear();
                self.status_message = Some(e.to_string());
                return;
            }
        };

        match normalize(&raw) {
            Ok(table) => self.set_listings(table),
            Err(e) => {
                log::error!("Listings file rejected: {e}");
                self.clear();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Ingest a normalized table, reset filters to the full extent.
    pub fn set_listings(&mut self, table: ListingTable) {
        self.status_message = None;
        self.counties = table.counties();
        self.selected_counties.clear();

        if table.is_empty() {
            log::warn!("Listings file has no rows");
            self.price_extent = None;
            self.acres_extent = None;
        } else {
            self.price_extent = extent(&table, NumericColumn::Price);
            self.acres_extent = extent(&table, NumericColumn::Acres);
        }
        self.price_range = self.price_extent;
        self.acres_range = self.acres_extent;

        self.listings = Some(table);
        self.refilter();
    }

    /// The criteria implied by the current selections. Ranges are clamped to
    /// the loaded extent; a column without values gets no numeric bound, which
    /// still excludes every row since all of them are missing.
    pub fn criteria(&self) -> FilterCriteria {
        fn effective(range: Option<Bounds>, extent: Option<Bounds>) -> Bounds {
            match (range, extent) {
                (Some(r), Some(e)) => r.clamp_within(&e),
                (_, Some(e)) => e,
                _ => Bounds::unbounded(),
            }
        }

        FilterCriteria {
            selected_counties: self.selected_counties.clone(),
            price_bounds: effective(self.price_range, self.price_extent),
            acres_bounds: effective(self.acres_range, self.acres_extent),
        }
    }

    /// Recompute the displayed rows after a selection change.
    pub fn refilter(&mut self) {
        self.display = match &self.listings {
            Some(table) if !table.is_empty() => {
                let filtered = filter(table, &self.criteria());
                log::debug!("{} of {} listings match", filtered.len(), table.len());
                Some(format_for_display(&filtered))
            }
            _ => None,
        };
    }

    pub fn toggle_county(&mut self, county: &str) {
        if !self.selected_counties.remove(county) {
            self.selected_counties.insert(county.to_string());
        }
        self.refilter();
    }

    pub fn clear_counties(&mut self) {
        self.selected_counties.clear();
        self.refilter();
    }

    /// Set a range from slider values, clamped to the column's extent.
    pub fn set_range(&mut self, column: NumericColumn, lo: f64, hi: f64) {
        let (range, extent) = match column {
            NumericColumn::Price => (&mut self.price_range, self.price_extent),
            NumericColumn::Acres => (&mut self.acres_range, self.acres_extent),
        };
        if let Some(extent) = extent {
            *range = Some(Bounds::new(lo, hi).clamp_within(&extent));
            self.refilter();
        }
    }

    pub fn view(&self) -> View<'_> {
        if let Some(msg) = &self.status_message {
            return View::Error(msg);
        }
        match &self.display {
            Some(display) => View::Listings(display),
            None => View::NoData,
        }
    }

    fn clear(&mut self) {
        self.listings = None;
        self.counties.clear();
        self.selected_counties.clear();
        self.price_extent = None;
        self.acres_extent = None;
        self.price_range = None;
        self.acres_range = None;
        self.display = None;
    }
}

fn extent(table: &ListingTable, column: NumericColumn) -> Option<Bounds> {
    match bounds(table, column) {
        Ok(b) => Some(b),
        Err(e) => {
            log::warn!("{e}; the {column} filter is disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::format::DisplayCell;
    use crate::data::loader::LoadError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticSource {
        body: &'static str,
        fetches: Arc<AtomicUsize>,
    }

    impl DataSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        fn fetch(&self) -> Result<Vec<u8>, LoadError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn describe(&self) -> String {
            "failing".to_string()
        }

        fn fetch(&self) -> Result<Vec<u8>, LoadError> {
            Err(LoadError::SourceUnavailable("access denied".into()))
        }
    }

    const CSV: &str = "County,Price,Acres,URL\n\
                       Bexar,\"$250,000\",10,http://a\n\
                       Travis,\"$1,250,000\",40,http://b\n\
                       Bexar,N/A,12,http://c\n\
                       Comal,\"$90,000\",2,http://d\n";

    fn state(body: &'static str) -> (AppState, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let mut s = AppState::new(Box::new(StaticSource {
            body,
            fetches: Arc::clone(&fetches),
        }));
        s.reload();
        (s, fetches)
    }

    fn price_column(s: &AppState) -> Vec<String> {
        match s.view() {
            View::Listings(d) => d
                .rows
                .iter()
                .map(|r| match &r[1] {
                    DisplayCell::Text(t) => t.clone(),
                    other => panic!("unexpected cell {other:?}"),
                })
                .collect(),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn initial_view_shows_all_complete_rows() {
        let (s, _) = state(CSV);
        assert_eq!(s.counties, vec!["Bexar", "Travis", "Comal"]);
        assert_eq!(s.price_extent, Some(Bounds::new(90_000.0, 1_250_000.0)));
        assert_eq!(price_column(&s), vec!["$250,000", "$1,250,000", "$90,000"]);
    }

    #[test]
    fn county_and_range_filters_combine() {
        let (mut s, _) = state(CSV);
        s.toggle_county("Bexar");
        s.toggle_county("Comal");
        assert_eq!(price_column(&s), vec!["$250,000", "$90,000"]);

        s.set_range(NumericColumn::Acres, 5.0, 40.0);
        assert_eq!(price_column(&s), vec!["$250,000"]);

        s.clear_counties();
        assert_eq!(price_column(&s), vec!["$250,000", "$1,250,000"]);
    }

    #[test]
    fn ranges_are_clamped_to_extent() {
        let (mut s, _) = state(CSV);
        s.set_range(NumericColumn::Price, 0.0, 10_000_000.0);
        assert_eq!(s.price_range, s.price_extent);
    }

    #[test]
    fn empty_table_is_no_data() {
        let (s, _) = state("County,Price,Acres,URL\n");
        assert_eq!(s.view(), View::NoData);
        assert_eq!(s.price_extent, None);
    }

    #[test]
    fn column_without_values_disables_only_that_filter() {
        let (mut s, _) = state("County,Price,Acres,URL\nBexar,call,10,http://a\n");
        assert_eq!(s.price_extent, None);
        assert_eq!(s.acres_extent, Some(Bounds::new(10.0, 10.0)));
        s.set_range(NumericColumn::Acres, 10.0, 10.0);
        match s.view() {
            View::Listings(d) => assert!(d.is_empty()),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_blocking_error() {
        let (s, _) = state("County,Price,URL\nBexar,1,http://a\n");
        assert!(matches!(s.view(), View::Error(msg) if msg.contains("Acres")));
    }

    #[test]
    fn load_failure_is_blocking_error() {
        let mut s = AppState::new(Box::new(FailingSource));
        s.reload();
        assert!(matches!(s.view(), View::Error(msg) if msg.contains("access denied")));
        assert!(s.listings.is_none());
    }

    #[test]
    fn refresh_refetches_and_reload_does_not() {
        let (mut s, fetches) = state(CSV);
        s.reload();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        s.refresh();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unconfigured_state_reports_reason() {
        let s = AppState::unconfigured("missing AWS_REGION".into());
        assert_eq!(s.view(), View::Error("missing AWS_REGION"));
        assert_eq!(s.source_description(), None);
    }
}
