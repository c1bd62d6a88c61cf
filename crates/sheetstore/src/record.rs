//! Records reconstructed from sheet rows.

use indexmap::IndexMap;

/// Placeholder written for missing trailing fields and for the empty-table
/// seed cell.
pub const NULL_SENTINEL: &str = "Null";

/// One data row keyed by the header row, preserving column order.
pub type Record = IndexMap<String, String>;

/// Build records from raw rows, the first row being the headers.
///
/// Short rows pad with empty strings, cells past the header width drop.
pub fn records_from_rows(rows: &[Vec<String>]) -> Vec<Record> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    data.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let value = row.get(idx).cloned().unwrap_or_default();
                    (name.clone(), value)
                })
                .collect()
        })
        .collect()
}
