//! Raw tabular input handed over by the ingestion layer.
//!
//! A [`RawTable`] is untyped: every cell is text and an empty cell is a
//! missing value. [`shape`](crate::core::shape) turns it into a typed
//! [`Table`](crate::core::Table).

use crate::error::{AnalyticsError, Result};
use std::io::Read;

/// Untyped table: named columns and rows of text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a raw table, checking that every row has one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    headers.len()
                )));
            }
        }
        Ok(Self { headers, rows })
    }

    /// Convenience constructor from string slices.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Read a header row plus records from delimited text.
    ///
    /// Short records are padded with missing cells; surrounding whitespace is
    /// trimmed from every field.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record
                .iter()
                .take(headers.len())
                .map(|f| f.to_string())
                .collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        tracing::debug!(columns = headers.len(), rows = rows.len(), "read raw table");
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom.
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_table_rejects_ragged_rows() {
        let err = RawTable::from_rows(&["date", "sales"], &[&["2024-01-01"]]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }

    #[test]
    fn raw_table_reads_csv_with_padding_and_trim() {
        let data = "Order Date, sales ,region\n2024-01-01, 10 ,north\n2024-01-02,12\n";
        let raw = RawTable::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(raw.headers(), &["Order Date", "sales", "region"]);
        assert_eq!(raw.row_count(), 2);
        assert_eq!(raw.rows()[0], vec!["2024-01-01", "10", "north"]);
        assert_eq!(raw.rows()[1], vec!["2024-01-02", "12", ""]);
    }

    #[test]
    fn raw_table_header_only_is_empty() {
        let raw = RawTable::from_csv_reader("date,value\n".as_bytes()).unwrap();
        assert!(raw.is_empty());
        assert_eq!(raw.headers().len(), 2);
    }

    #[test]
    fn column_cells_iterates_in_row_order() {
        let raw = RawTable::from_rows(&["a", "b"], &[&["1", "x"], &["2", "y"]]).unwrap();
        let cells: Vec<&str> = raw.column_cells(1).collect();
        assert_eq!(cells, vec!["x", "y"]);
    }
}
