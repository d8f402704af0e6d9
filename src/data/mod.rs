/// Data layer: loading, normalization, filtering and display formatting.
///
/// Architecture:
/// ```text
///   S3 object / local .csv
///        │
///        ▼
///   ┌──────────────┐
///   │ loader (+s3)  │  fetch bytes, parse CSV → RawTable, memoize per epoch
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  normalize    │  RawTable → ListingTable (typed Price / Acres)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   filter      │  county set + price/acres bounds → FilteredListings
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │   format      │  currency strings, link cells → DisplayTable
///   └──────────────┘
/// ```

pub mod filter;
pub mod format;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod s3;
