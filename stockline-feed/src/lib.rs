//! Pipe-delimited inventory feed parsing.
//!
//! The nightly export is a `|`-delimited file with no header row and a
//! raggedy tail: short rows are summary/noise lines, not records. A row
//! qualifies only when it carries more than [`MIN_FIELDS`] fields, in which
//! case the identifier, price, and quantity columns are lifted out by
//! position.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::io::Read;
use thiserror::Error;

/// A row must have *more* than this many fields to qualify.
pub const MIN_FIELDS: usize = 10;

const IDX_UPC: usize = 0;
const IDX_PRICE: usize = 4;
const IDX_QUANTITY: usize = 5;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed read failed: {0}")]
    Csv(#[from] csv::Error),
}

/// The fields the pipeline cares about, by position: 0, 4, 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub upc: String,
    pub price: String,
    pub quantity: String,
}

/// Select the interesting fields from one tokenized row, or `None` when the
/// row does not qualify.
pub fn select_record(record: &StringRecord) -> Option<InventoryRecord> {
    if record.len() <= MIN_FIELDS {
        return None;
    }
    Some(InventoryRecord {
        upc: record.get(IDX_UPC).unwrap_or_default().to_string(),
        price: record.get(IDX_PRICE).unwrap_or_default().to_string(),
        quantity: record.get(IDX_QUANTITY).unwrap_or_default().to_string(),
    })
}

/// Read a whole feed, yielding only the qualifying rows.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<InventoryRecord>, FeedError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut out = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if let Some(record) = select_record(&row) {
            out.push(record);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn selects_positional_fields_from_wide_rows() {
        let row = record(&[
            "0123456789", "desc", "brand", "size", "9.99", "12", "a", "b", "c", "d", "e",
        ]);
        let rec = select_record(&row).expect("11 fields qualifies");
        assert_eq!(rec.upc, "0123456789");
        assert_eq!(rec.price, "9.99");
        assert_eq!(rec.quantity, "12");
    }

    #[test]
    fn rows_with_ten_or_fewer_fields_yield_nothing() {
        let exactly_ten = record(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        assert!(select_record(&exactly_ten).is_none());

        let short = record(&["summary line"]);
        assert!(select_record(&short).is_none());
    }

    #[test]
    fn reads_a_pipe_delimited_feed_end_to_end() {
        let feed = "\
0001|x|x|x|1.50|3|x|x|x|x|x
trailer
0002|y|y|y|2.25|7|y|y|y|y|y|y
";
        let records = read_records(feed.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].upc, "0001");
        assert_eq!(records[0].price, "1.50");
        assert_eq!(records[0].quantity, "3");
        assert_eq!(records[1].upc, "0002");
    }

    #[test]
    fn empty_feed_yields_no_records() {
        assert!(read_records("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn records_serialize_for_json_output() {
        let rec = InventoryRecord {
            upc: "0001".into(),
            price: "1.50".into(),
            quantity: "3".into(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"upc":"0001","price":"1.50","quantity":"3"}"#);
    }
}
