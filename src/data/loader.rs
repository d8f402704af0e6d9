use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::model::RawTable;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("listings file is not valid CSV: {0}")]
    Format(String),
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere the listings CSV can be fetched from.
pub trait DataSource: Send + Sync {
    /// Human-readable identity, shown in the status bar and logs.
    fn describe(&self) -> String;

    /// Fetch the whole object. Blocks until complete or failed.
    fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}

/// A CSV file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        std::fs::read(&self.path)
            .map_err(|e| LoadError::SourceUnavailable(format!("{}: {e}", self.path.display())))
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse CSV bytes into a [`RawTable`]. A header row is required; a file with
/// only a header is a valid, empty table.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Format(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::Format("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Format(format!("row {row_no}: {e}")))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Memoizes the parsed table for one source until [`invalidate`] is called.
///
/// The lock is held across the fetch, so concurrent callers wait for a single
/// in-flight request and all receive the same `Arc`. Failures are not cached.
///
/// [`invalidate`]: ListingCache::invalidate
pub struct ListingCache {
    source: Box<dyn DataSource>,
    table: Mutex<Option<Arc<RawTable>>>,
}

impl ListingCache {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            table: Mutex::new(None),
        }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub fn load(&self) -> Result<Arc<RawTable>, LoadError> {
        let mut slot = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }

        log::info!("Fetching listings from {}", self.source.describe());
        let bytes = self.source.fetch()?;
        let table = Arc::new(parse_csv(&bytes)?);
        log::info!(
            "Loaded {} listings with columns {:?}",
            table.len(),
            table.headers
        );

        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the memoized table; the next [`load`](Self::load) re-fetches.
    pub fn invalidate(&self) {
        let mut slot = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            log::debug!("Listing cache invalidated");
        }
    }
}
