use super::model::{
    Listing, ListingTable, PipelineError, RawTable, Slot, ACRES, COUNTY, PRICE, URL,
};

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Parse a currency cell such as `"$1,250,000"`.
///
/// Every `$` and `,` is removed before parsing, wherever it appears. Anything
/// that still fails a full numeric parse is treated as missing, as are
/// non-finite results.
pub fn parse_price(cell: &str) -> Option<f64> {
    let cleaned: String = cell.chars().filter(|c| *c != '$' && *c != ',').collect();
    parse_number(&cleaned)
}

/// Parse an acreage cell. No symbols are stripped.
pub fn parse_acres(cell: &str) -> Option<f64> {
    parse_number(cell)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Table normalization
// ---------------------------------------------------------------------------

/// Turn the loaded CSV into typed listings.
///
/// Fails only when one of the required columns is absent. Unparseable numeric
/// cells never fail the table; they become `None`.
pub fn normalize(raw: &RawTable) -> Result<ListingTable, PipelineError> {
    for required in [COUNTY, PRICE, ACRES, URL] {
        if raw.column_index(required).is_none() {
            return Err(PipelineError::MissingColumn(required));
        }
    }

    let mut n_extra = 0;
    let layout: Vec<Slot> = raw
        .headers
        .iter()
        .map(|h| match h.as_str() {
            COUNTY => Slot::County,
            PRICE => Slot::Price,
            ACRES => Slot::Acres,
            URL => Slot::Url,
            _ => {
                n_extra += 1;
                Slot::Extra(n_extra - 1)
            }
        })
        .collect();

    let mut missing_price = 0usize;
    let mut missing_acres = 0usize;

    let listings: Vec<Listing> = raw
        .rows
        .iter()
        .map(|row| {
            let mut listing = Listing {
                county: String::new(),
                price: None,
                acres: None,
                url: String::new(),
                extra: vec![String::new(); n_extra],
            };
            for (cell, slot) in row.iter().zip(&layout) {
                match slot {
                    Slot::County => listing.county = cell.clone(),
                    Slot::Price => listing.price = parse_price(cell),
                    Slot::Acres => listing.acres = parse_acres(cell),
                    Slot::Url => listing.url = cell.clone(),
                    Slot::Extra(i) => listing.extra[*i] = cell.clone(),
                }
            }
            missing_price += usize::from(listing.price.is_none());
            missing_acres += usize::from(listing.acres.is_none());
            listing
        })
        .collect();

    if missing_price > 0 || missing_acres > 0 {
        log::warn!(
            "{missing_price} listing(s) without a usable price, {missing_acres} without usable acreage"
        );
    }

    Ok(ListingTable {
        columns: raw.headers.clone(),
        layout,
        listings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn price_strips_symbol_and_grouping() {
        assert_eq!(parse_price("$1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_price("250000"), Some(250_000.0));
        assert_eq!(parse_price(" $99.50 "), Some(99.5));
        assert_eq!(parse_price("1,000$"), Some(1000.0));
    }

    #[test]
    fn price_unparseable_is_missing() {
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price("$1.2.3"), None);
        assert_eq!(parse_price("nan"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn negative_price_parses() {
        assert_eq!(parse_price("-$1,000"), Some(-1000.0));
        assert_eq!(parse_price("$-1,000"), Some(-1000.0));
    }

    #[test]
    fn acres_do_not_strip_symbols() {
        assert_eq!(parse_acres("10"), Some(10.0));
        assert_eq!(parse_acres("2.75"), Some(2.75));
        assert_eq!(parse_acres("1,000"), None);
        assert_eq!(parse_acres("ten"), None);
    }

    #[test]
    fn normalize_types_the_required_columns() {
        let t = raw(
            &["County", "Price", "Acres", "URL", "Notes"],
            &[&["Bexar", "$250,000", "10", "http://x", "creek"]],
        );
        let table = normalize(&t).unwrap();
        let l = &table.listings[0];
        assert_eq!(l.county, "Bexar");
        assert_eq!(l.price, Some(250_000.0));
        assert_eq!(l.acres, Some(10.0));
        assert_eq!(l.url, "http://x");
        assert_eq!(l.extra, vec!["creek".to_string()]);
        assert_eq!(table.layout[4], Slot::Extra(0));
    }

    #[test]
    fn normalize_keeps_column_order() {
        let t = raw(
            &["URL", "Zip", "Acres", "County", "Price", "Owner"],
            &[&["http://a", "78201", "3", "Bexar", "$5", "Ann"]],
        );
        let table = normalize(&t).unwrap();
        assert_eq!(table.columns, t.headers);
        assert_eq!(table.to_raw().rows[0][1], "78201");
        assert_eq!(table.to_raw().rows[0][5], "Ann");
    }

    #[test]
    fn normalize_reports_missing_column() {
        let t = raw(&["County", "Price", "URL"], &[]);
        assert_eq!(normalize(&t), Err(PipelineError::MissingColumn(ACRES)));
    }

    #[test]
    fn normalize_marks_bad_cells_missing() {
        let t = raw(
            &["County", "Price", "Acres", "URL"],
            &[&["Bexar", "N/A", "abc", "http://x"]],
        );
        let table = normalize(&t).unwrap();
        assert_eq!(table.listings[0].price, None);
        assert_eq!(table.listings[0].acres, None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let t = raw(
            &["County", "Price", "Acres", "URL", "Notes"],
            &[
                &["Bexar", "$250,000", "10", "http://x", "a"],
                &["Travis", "N/A", "0.3333333333333333", "http://y", ""],
                &["Comal", "$1,250,000.75", "", "http://z", "c,d"],
            ],
        );
        let once = normalize(&t).unwrap();
        let twice = normalize(&once.to_raw()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_leaves_input_untouched() {
        let t = raw(
            &["County", "Price", "Acres", "URL"],
            &[&["Bexar", "$250,000", "10", "http://x"]],
        );
        let before = t.clone();
        let _ = normalize(&t).unwrap();
        assert_eq!(t, before);
    }
}
