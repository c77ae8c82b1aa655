//! CSV Data Loader Module
//! Loads wave tables from CSV files using Polars and extracts typed columns.

use crate::data::tables::{
    BuoyRecords, CaptureMatrix, ElevationSeries, NamedColumn, Spectrum, TimeIndex,
};
use crate::error::{GraphicsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Whether a column holds real numbers.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Parse a text timestamp in one of the accepted layouts.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim().trim_matches('"');
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(t);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| GraphicsError::Timestamp(text.to_string()))
}

/// Loads a CSV table with Polars and hands out typed wave tables.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Wrap an already built DataFrame.
    pub fn from_dataframe(df: DataFrame) -> Self {
        Self { df: Some(df) }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame> {
        let path = file_path.as_ref();

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        debug!(path = %path.display(), rows = df.height(), "loaded csv");

        self.df = Some(df);
        self.df.as_ref().ok_or(GraphicsError::NoData)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get list of numeric column names.
    pub fn get_numeric_columns(&self) -> Vec<String> {
        let Some(df) = &self.df else {
            return Vec::new();
        };

        df.get_columns()
            .iter()
            .filter(|col| is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    fn dataframe(&self) -> Result<&DataFrame> {
        self.df.as_ref().ok_or(GraphicsError::NoData)
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.dataframe()?
            .column(name)
            .map_err(|_| GraphicsError::MissingColumn(name.to_string()))
    }

    /// Numeric column as `f64`, nulls as NaN.
    pub fn values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column(name)?;
        if !is_numeric(column.dtype()) {
            return Err(GraphicsError::InvalidInputKind(format!(
                "column '{}' has type {}, expected a real numeric type",
                name,
                column.dtype()
            )));
        }
        let values = column.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Timestamps from a text, Unix-seconds or datetime column. Missing
    /// entries come back as `None`.
    pub fn timestamps(&self, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
        let column = self.column(name)?;
        match column.dtype() {
            DataType::String => column
                .str()?
                .into_iter()
                .map(|v| v.map(parse_timestamp).transpose())
                .collect(),
            DataType::Datetime(unit, _) => {
                let per_second = match unit {
                    TimeUnit::Nanoseconds => 1e9,
                    TimeUnit::Microseconds => 1e6,
                    TimeUnit::Milliseconds => 1e3,
                };
                let raw = column.cast(&DataType::Int64)?;
                Ok(raw
                    .i64()?
                    .into_iter()
                    .map(|v| v.and_then(|v| from_epoch(v as f64 / per_second)))
                    .collect())
            }
            dtype if is_numeric(dtype) => {
                let raw = column.cast(&DataType::Float64)?;
                Ok(raw
                    .f64()?
                    .into_iter()
                    .map(|v| v.and_then(from_epoch))
                    .collect())
            }
            other => Err(GraphicsError::InvalidInputKind(format!(
                "column '{}' has type {}, expected timestamps",
                name, other
            ))),
        }
    }

    /// Hs / Tp / Dp records. Rows without a timestamp are dropped.
    pub fn buoy_records(
        &self,
        time_col: &str,
        hs_col: &str,
        tp_col: &str,
        dp_col: &str,
    ) -> Result<BuoyRecords> {
        let times = self.timestamps(time_col)?;
        let hs = self.values(hs_col)?;
        let tp = self.values(tp_col)?;
        let dp = self.values(dp_col)?;

        let mut records = BuoyRecords {
            times: Vec::with_capacity(times.len()),
            hs: Vec::with_capacity(times.len()),
            tp: Vec::with_capacity(times.len()),
            dp: Vec::with_capacity(times.len()),
        };
        let mut skipped = 0usize;
        for (i, t) in times.into_iter().enumerate() {
            let Some(t) = t else {
                skipped += 1;
                continue;
            };
            records.times.push(t);
            records.hs.push(hs[i]);
            records.tp.push(tp[i]);
            records.dp.push(dp[i]);
        }
        if skipped > 0 {
            warn!(skipped, column = time_col, "dropped rows without a timestamp");
        }
        Ok(records)
    }

    /// Spectrum indexed by `freq_col`; every other numeric column is a density.
    pub fn spectrum(&self, freq_col: &str) -> Result<Spectrum> {
        let frequency = self.values(freq_col)?;
        let columns = self.numeric_columns_except(freq_col)?;
        Spectrum::new(frequency, columns)
    }

    /// Elevation record indexed by `time_col`, which may hold seconds or
    /// timestamps.
    pub fn elevation(&self, time_col: &str) -> Result<ElevationSeries> {
        let column = self.column(time_col)?;
        let index = if is_numeric(column.dtype()) {
            TimeIndex::Seconds(self.values(time_col)?)
        } else {
            let times = self
                .timestamps(time_col)?
                .into_iter()
                .map(|t| t.ok_or_else(|| GraphicsError::Timestamp(format!("missing value in '{}'", time_col))))
                .collect::<Result<Vec<_>>>()?;
            TimeIndex::Datetime(times)
        };
        let columns = self.numeric_columns_except(time_col)?;
        ElevationSeries::new(index, columns)
    }

    /// Matrix with row labels from `row_col`. The remaining numeric column
    /// names must be numbers; they become the column labels.
    pub fn capture_matrix(&self, row_col: &str) -> Result<CaptureMatrix> {
        let y_labels = self.values(row_col)?;
        let columns = self.numeric_columns_except(row_col)?;

        let x_labels = columns
            .iter()
            .map(|c| {
                c.name.trim().parse::<f64>().map_err(|_| {
                    GraphicsError::InvalidInputKind(format!(
                        "column label '{}' is not a number",
                        c.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let values = (0..y_labels.len())
            .map(|row| columns.iter().map(|c| c.values[row]).collect())
            .collect();

        CaptureMatrix::new(x_labels, y_labels, values)
    }

    fn numeric_columns_except(&self, skip: &str) -> Result<Vec<NamedColumn>> {
        self.get_numeric_columns()
            .into_iter()
            .filter(|name| name != skip)
            .map(|name| {
                let values = self.values(&name)?;
                Ok(NamedColumn::new(name, values))
            })
            .collect()
    }
}

fn from_epoch(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|t| t.naive_utc())
}
