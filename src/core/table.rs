//! Typed table and the shaping step that produces it.
//!
//! [`shape`] locates the date column, parses it, infers which of the other
//! columns are numeric and orders the rows chronologically. [`validate`]
//! then decides whether the result can feed the analyzers.

use crate::core::ingest::RawTable;
use crate::core::series::Series;
use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Canonical name of the date-role column after shaping.
pub const DATE_COLUMN: &str = "date";

/// Values of a non-date column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Floating point values; missing values are `NaN`.
    Numeric(Vec<f64>),
    /// Anything that is not numeric, including columns with no observed number.
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    fn reorder(&self, order: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(order.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(order.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// A named non-date column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Numeric values, or `None` for a text column.
    pub fn numeric_values(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DateColumn {
    /// Position of the date column among all columns, for display order.
    position: usize,
    values: Vec<NaiveDate>,
}

/// A shaped table: an optional date column plus typed value columns.
///
/// When a date column is present the rows are in chronological order
/// (stable with respect to the input order for equal dates).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    date: Option<DateColumn>,
    columns: Vec<Column>,
    row_count: usize,
}

/// Builder for constructing a [`Table`] directly, without a raw table.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    dates: Option<Vec<NaiveDate>>,
    columns: Vec<Column>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date column. It is placed first in column order.
    pub fn dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.dates = Some(dates);
        self
    }

    pub fn numeric(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push(Column::numeric(name, values));
        self
    }

    pub fn text(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.columns.push(Column::text(name, values));
        self
    }

    pub fn build(self) -> Result<Table> {
        Table::new(self.dates.map(|d| (0, d)), self.columns)
    }
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Create a table from an optional `(position, dates)` pair and columns.
    ///
    /// All columns must have the same length, and with a date column present
    /// no other column may be named `"date"`. Rows are reordered by date.
    pub fn new(date: Option<(usize, Vec<NaiveDate>)>, columns: Vec<Column>) -> Result<Self> {
        let row_count = match (&date, columns.first()) {
            (Some((_, dates)), _) => dates.len(),
            (None, Some(first)) => first.data.len(),
            (None, None) => 0,
        };

        for column in &columns {
            if column.data.len() != row_count {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    row_count
                )));
            }
        }

        if date.is_some() && columns.iter().any(|c| c.name == DATE_COLUMN) {
            return Err(AnalyticsError::Validation(format!(
                "column '{}' clashes with the detected date column",
                DATE_COLUMN
            )));
        }

        let mut table = Self {
            date: date.map(|(position, values)| DateColumn {
                position: position.min(columns.len()),
                values,
            }),
            columns,
            row_count,
        };
        table.sort_chronologically();
        Ok(table)
    }

    fn sort_chronologically(&mut self) {
        let Some(date) = &self.date else {
            return;
        };
        if date.values.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }

        let mut order: Vec<usize> = (0..self.row_count).collect();
        order.sort_by_key(|&i| date.values[i]);

        let sorted_dates = order.iter().map(|&i| date.values[i]).collect();
        for column in &mut self.columns {
            column.data = column.data.reorder(&order);
        }
        if let Some(date) = &mut self.date {
            date.values = sorted_dates;
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn has_date_column(&self) -> bool {
        self.date.is_some()
    }

    /// Parsed dates, if a date column was established.
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.date.as_ref().map(|d| d.values.as_slice())
    }

    /// Non-date columns in their original order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a non-date column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All column names in display order, with the date column as `"date"`.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        if let Some(date) = &self.date {
            names.insert(date.position, DATE_COLUMN.to_string());
        }
        names
    }

    /// Extract one numeric column as a [`Series`] paired with the dates.
    pub fn series(&self, column: &str) -> Result<Series> {
        let dates = self
            .dates()
            .ok_or_else(|| AnalyticsError::Validation("No date column found".to_string()))?;
        if column == DATE_COLUMN {
            return Err(AnalyticsError::NotNumeric(column.to_string()));
        }
        let col = self
            .column(column)
            .ok_or_else(|| AnalyticsError::UnknownColumn(column.to_string()))?;
        let values = col
            .numeric_values()
            .ok_or_else(|| AnalyticsError::NotNumeric(column.to_string()))?;
        Series::new(column, dates.to_vec(), values.to_vec())
    }

    /// Content hash identifying this version of the data.
    ///
    /// Two tables with the same column names, dates and values (bit for bit)
    /// share a fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.row_count.hash(&mut hasher);
        if let Some(date) = &self.date {
            date.position.hash(&mut hasher);
            date.values.hash(&mut hasher);
        }
        for column in &self.columns {
            column.name.hash(&mut hasher);
            match &column.data {
                ColumnData::Numeric(values) => {
                    0u8.hash(&mut hasher);
                    for v in values {
                        v.to_bits().hash(&mut hasher);
                    }
                }
                ColumnData::Text(values) => {
                    1u8.hash(&mut hasher);
                    values.hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }
}

/// Shape a raw table into the engine's typed form.
///
/// The first column whose name contains `date` (case-insensitive) becomes
/// the date column and is renamed to `"date"`. Every one of its cells must
/// parse as a date, otherwise the whole operation fails with
/// [`AnalyticsError::Parse`]. A table without such a column is still
/// returned; [`validate`] reports it.
pub fn shape(raw: &RawTable) -> Result<Table> {
    let date_index = raw
        .headers()
        .iter()
        .position(|h| h.to_lowercase().contains(DATE_COLUMN));

    let date = match date_index {
        Some(index) => {
            let name = &raw.headers()[index];
            let mut values = Vec::with_capacity(raw.row_count());
            for (row, cell) in raw.column_cells(index).enumerate() {
                let parsed = parse_date(cell).ok_or_else(|| AnalyticsError::Parse {
                    column: name.clone(),
                    row,
                    value: cell.to_string(),
                })?;
                values.push(parsed);
            }
            tracing::debug!(column = %name, "using date column");
            Some((index, values))
        }
        None => {
            tracing::debug!("no date column in input");
            None
        }
    };

    let columns = raw
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != date_index)
        .map(|(i, name)| infer_column(name, raw.column_cells(i)))
        .collect();

    Table::new(date, columns).map(|mut table| {
        // A raw table without any columns still has a row count.
        table.row_count = raw.row_count();
        table
    })
}

/// Infer a column's type: numeric when every non-missing cell is a number
/// and at least one cell holds a finite value.
fn infer_column<'a>(name: &str, cells: impl Iterator<Item = &'a str>) -> Column {
    let cells: Vec<&str> = cells.collect();
    let parsed: Option<Vec<f64>> = cells.iter().map(|c| parse_number(c)).collect();
    match parsed {
        Some(values) if values.iter().any(|v| !v.is_nan()) => Column::numeric(name, values),
        _ => Column::text(name, cells.iter().map(|c| c.to_string()).collect()),
    }
}

/// Parse a numeric cell. Empty and non-finite cells are missing (`NaN`);
/// `None` means the cell is not a number at all.
fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    let value: f64 = cell.parse().ok()?;
    Some(if value.is_finite() { value } else { f64::NAN })
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date cell, accepting plain dates, naive datetimes and RFC 3339
/// timestamps. Time-of-day is dropped.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(cell)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub message: String,
}

impl Validation {
    /// Convert a failed validation into [`AnalyticsError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(AnalyticsError::Validation(self.message))
        }
    }
}

/// Check that a table can feed the analyzers.
pub fn validate(table: &Table) -> Validation {
    let fail = |message: &str| Validation {
        is_valid: false,
        message: message.to_string(),
    };

    if table.is_empty() {
        return fail("Dataset is empty");
    }
    if !table.has_date_column() {
        return fail("No date column found");
    }
    let numeric = numeric_columns(table).len();
    if numeric == 0 {
        return fail("No numeric columns found");
    }

    Validation {
        is_valid: true,
        message: format!("Valid dataset with {} numeric columns", numeric),
    }
}

/// Names of the numeric columns in column order. The date column is never
/// included.
pub fn numeric_columns(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.data.is_numeric())
        .map(|c| c.name.clone())
        .collect()
}

/// Shape and validate in one step, failing on any validation problem.
pub fn shape_validated(raw: &RawTable) -> Result<Table> {
    let table = shape(raw)?;
    validate(&table).into_result()?;
    Ok(table)
}
