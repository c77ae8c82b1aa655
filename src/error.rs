//! Error type shared by loaders, chart builders and the renderer.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphicsError {
    #[error("Invalid input kind: {0}")]
    InvalidInputKind(String),
    #[error("{what} must be same shape: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Number of contour labels must equal the number of contours: expected {expected}, got {got}")]
    LabelCount { expected: usize, got: usize },
    #[error("{0} contains no samples")]
    EmptySeries(&'static str),
    #[error("No data loaded")]
    NoData,
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Unrecognized timestamp: {0}")]
    Timestamp(String),
    #[error("Failed to load CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid figure config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, GraphicsError>;

impl GraphicsError {
    pub(crate) fn shape(what: &'static str, expected: usize, got: usize) -> Self {
        GraphicsError::ShapeMismatch {
            what,
            expected,
            got,
        }
    }
}
