//! Data module - CSV loading and wave tables

mod loader;
mod processor;
mod tables;

pub use loader::{is_numeric, parse_timestamp, DataLoader};
pub use processor::{DataProcessor, MonthGroup};
pub use tables::{
    epoch_seconds, BuoyRecords, CaptureMatrix, ElevationSeries, NamedColumn, Spectrum, TimeIndex,
    WaveSeries,
};
