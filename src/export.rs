//! Delimited-text export of forecasts.
//!
//! Columns are `date, predicted, best_case, worst_case, confidence_lower,
//! confidence_upper` with ISO-8601 dates. Floats are written with full
//! precision, so reading an export back reproduces the forecast exactly.

use crate::core::{ForecastResult, ForecastRow};
use crate::error::{AnalyticsError, Result};
use std::io::{Read, Write};

/// Write a forecast as CSV with a header row.
pub fn write_forecast_csv<W: Write>(forecast: &ForecastResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if forecast.is_empty() {
        // serde only emits the header together with the first record
        wtr.write_record([
            "date",
            "predicted",
            "best_case",
            "worst_case",
            "confidence_lower",
            "confidence_upper",
        ])?;
    }
    for row in forecast.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()
        .map_err(|e| AnalyticsError::Csv(e.to_string()))?;
    Ok(())
}

/// Render a forecast as a CSV string.
pub fn forecast_to_csv(forecast: &ForecastResult) -> Result<String> {
    let mut buf = Vec::new();
    write_forecast_csv(forecast, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AnalyticsError::Csv(e.to_string()))
}

/// Read a forecast back from CSV produced by [`write_forecast_csv`].
pub fn read_forecast_csv<R: Read>(reader: R) -> Result<ForecastResult> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .deserialize::<ForecastRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ForecastResult::from_rows(rows))
}
