//! Wave Graphics - ocean wave resource charts
//!
//! Chart builders record onto an explicit [`charts::Axes`] or
//! [`charts::Figure`] surface which [`charts::FigureRenderer`] turns into SVG
//! or PNG output.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod stats;

pub use config::{FigureConfig, OutputFormat};
pub use error::{GraphicsError, Result};
