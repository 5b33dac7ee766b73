//! Core data structures: raw input, shaped tables, series and forecasts.

mod forecast;
mod ingest;
mod series;
mod table;

pub use forecast::{ForecastResult, ForecastRow};
pub use ingest::RawTable;
pub use series::Series;
pub(crate) use series::days_from;
pub use table::{
    numeric_columns, parse_date, shape, shape_validated, validate, Column, ColumnData, Table,
    TableBuilder, Validation, DATE_COLUMN,
};
