//! Data Processor Module
//! Groups wave series by calendar month for the monthly summaries.

use crate::data::tables::WaveSeries;
use chrono::Datelike;
use std::collections::BTreeMap;

/// Samples of one calendar month, pooled across years.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    /// Month number, 1 = January.
    pub month: u32,
    pub values: Vec<f64>,
    pub mean: f64,
}

impl MonthGroup {
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

pub struct DataProcessor;

impl DataProcessor {
    /// Split `series` by calendar month, ascending. NaN samples are skipped
    /// and months without samples are left out.
    pub fn group_by_month(series: &WaveSeries) -> Vec<MonthGroup> {
        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (t, &v) in series.times.iter().zip(&series.values) {
            if v.is_nan() {
                continue;
            }
            by_month.entry(t.month()).or_default().push(v);
        }

        by_month
            .into_iter()
            .map(|(month, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                MonthGroup {
                    month,
                    values,
                    mean,
                }
            })
            .collect()
    }

    /// "YYYY-MM-DD to YYYY-MM-DD" for the first and last sample.
    pub fn date_span(series: &WaveSeries) -> Option<String> {
        let first = series.first_time()?;
        let last = series.last_time()?;
        Some(format!("{} to {}", first.date(), last.date()))
    }
}
