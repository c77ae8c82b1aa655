//! Typed wave tables handed to the chart functions.

use crate::error::{GraphicsError, Result};
use chrono::NaiveDateTime;

/// A named sequence of values sampled at timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSeries {
    pub name: String,
    pub times: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl WaveSeries {
    pub fn new(
        name: impl Into<String>,
        times: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if times.len() != values.len() {
            return Err(GraphicsError::shape("times and values", times.len(), values.len()));
        }
        Ok(Self {
            name: name.into(),
            times,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.times.last().copied()
    }

    /// `(unix seconds, value)` pairs in sample order.
    pub fn epoch_points(&self) -> Vec<(f64, f64)> {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(t, &v)| (epoch_seconds(t), v))
            .collect()
    }
}

pub fn epoch_seconds(t: &NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64 + f64::from(t.and_utc().timestamp_subsec_millis()) / 1000.0
}

/// Wave parameters recorded by a buoy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuoyRecords {
    pub times: Vec<NaiveDateTime>,
    /// Significant wave height [m].
    pub hs: Vec<f64>,
    /// Peak period [s].
    pub tp: Vec<f64>,
    /// Peak direction [deg].
    pub dp: Vec<f64>,
}

impl BuoyRecords {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn hs(&self) -> WaveSeries {
        self.series("Hs", &self.hs)
    }

    pub fn tp(&self) -> WaveSeries {
        self.series("Tp", &self.tp)
    }

    pub fn dp(&self) -> WaveSeries {
        self.series("Dp", &self.dp)
    }

    fn series(&self, name: &str, values: &[f64]) -> WaveSeries {
        WaveSeries {
            name: name.to_string(),
            times: self.times.clone(),
            values: values.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl NamedColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

fn check_columns(what: &'static str, expected: usize, columns: &[NamedColumn]) -> Result<()> {
    match columns.iter().find(|c| c.values.len() != expected) {
        Some(c) => Err(GraphicsError::shape(what, expected, c.values.len())),
        None => Ok(()),
    }
}

/// Spectral density [m²/Hz] indexed by frequency [Hz].
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub frequency: Vec<f64>,
    pub columns: Vec<NamedColumn>,
}

impl Spectrum {
    pub fn new(frequency: Vec<f64>, columns: Vec<NamedColumn>) -> Result<Self> {
        check_columns("spectrum columns and frequency index", frequency.len(), &columns)?;
        Ok(Self { frequency, columns })
    }
}

/// Time index of an elevation record.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    Seconds(Vec<f64>),
    Datetime(Vec<NaiveDateTime>),
}

impl TimeIndex {
    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Seconds(v) => v.len(),
            TimeIndex::Datetime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions on a numeric axis: seconds as given, datetimes as unix seconds.
    pub fn positions(&self) -> Vec<f64> {
        match self {
            TimeIndex::Seconds(v) => v.clone(),
            TimeIndex::Datetime(v) => v.iter().map(epoch_seconds).collect(),
        }
    }
}

/// Surface elevation [m] indexed by time.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationSeries {
    pub index: TimeIndex,
    pub columns: Vec<NamedColumn>,
}

impl ElevationSeries {
    pub fn new(index: TimeIndex, columns: Vec<NamedColumn>) -> Result<Self> {
        check_columns("elevation columns and time index", index.len(), &columns)?;
        Ok(Self { index, columns })
    }
}

/// Matrix with numeric row and column labels, e.g. a capture length matrix
/// binned by energy period (columns) and wave height (rows).
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureMatrix {
    pub x_labels: Vec<f64>,
    pub y_labels: Vec<f64>,
    /// Row-major, one row per `y_labels` entry. NaN marks an empty bin.
    pub values: Vec<Vec<f64>>,
}

impl CaptureMatrix {
    pub fn new(x_labels: Vec<f64>, y_labels: Vec<f64>, values: Vec<Vec<f64>>) -> Result<Self> {
        if values.len() != y_labels.len() {
            return Err(GraphicsError::shape("matrix rows and row labels", y_labels.len(), values.len()));
        }
        if let Some(row) = values.iter().find(|r| r.len() != x_labels.len()) {
            return Err(GraphicsError::shape("matrix columns and column labels", x_labels.len(), row.len()));
        }
        Ok(Self {
            x_labels,
            y_labels,
            values,
        })
    }

    /// Smallest and largest finite entry.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn epoch_of_known_date() {
        let t = NaiveDate::from_ymd_opt(2012, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(epoch_seconds(&t), 1_333_238_400.0);
    }

    #[test]
    fn ragged_tables_are_rejected() {
        let err = Spectrum::new(vec![0.1, 0.2], vec![NamedColumn::new("S", vec![1.0])]).unwrap_err();
        assert!(matches!(err, GraphicsError::ShapeMismatch { expected: 2, got: 1, .. }));

        let err = CaptureMatrix::new(vec![1.0, 2.0], vec![1.0], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, GraphicsError::ShapeMismatch { .. }));
    }

    #[test]
    fn matrix_range_skips_nan() {
        let m = CaptureMatrix::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![vec![f64::NAN, 3.0], vec![-1.0, 2.0]],
        )
        .unwrap();
        assert_eq!(m.value_range(), Some((-1.0, 3.0)));
    }
}
