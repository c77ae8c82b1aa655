//! Stats module - box summaries for wave charts

mod calculator;

pub use calculator::{BoxStats, StatsCalculator, WHISKER_IQR};
