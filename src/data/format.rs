use super::filter::FilteredListings;
use super::model::Slot;

/// Label shown in place of the raw URL.
pub const LINK_LABEL: &str = "Open Land Page";

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCell {
    Text(String),
    Link { url: String, label: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<DisplayCell>>,
}

impl DisplayTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `$` prefix, comma thousands grouping, no decimals: `1250000.0` → `$1,250,000`.
///
/// The sign sits after the symbol (`$-1,000`).
pub fn format_currency(value: f64) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${sign}{grouped}")
}

/// Render filtered listings for the table view.
pub fn format_for_display(filtered: &FilteredListings) -> DisplayTable {
    let table = filtered.table();
    let rows = table
        .listings
        .iter()
        .map(|l| {
            table
                .layout
                .iter()
                .map(|slot| match slot {
                    Slot::County => DisplayCell::Text(l.county.clone()),
                    Slot::Price => DisplayCell::Text(l.price.map(format_currency).unwrap_or_default()),
                    Slot::Acres => DisplayCell::Text(l.acres.map(|a| a.to_string()).unwrap_or_default()),
                    Slot::Url => DisplayCell::Link {
                        url: l.url.clone(),
                        label: LINK_LABEL,
                    },
                    Slot::Extra(i) => DisplayCell::Text(l.extra.get(*i).cloned().unwrap_or_default()),
                })
                .collect()
        })
        .collect();

    DisplayTable {
        columns: table.columns.clone(),
        rows,
    }
}
