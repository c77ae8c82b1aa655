//! Charts module - chart builders and rendering

pub mod buoy;
pub mod chakrabarti;
pub mod figure;
mod format;
mod renderer;
pub mod resource;

pub use buoy::{plot_boxplot, plot_compendium};
pub use chakrabarti::{plot_chakrabarti, Observation, Observations, Quantity, RegimePoint};
pub use figure::{Axes, Figure};
pub use format::{format_general, month_abbrev};
pub use renderer::FigureRenderer;
pub use resource::{
    plot_elevation_timeseries, plot_environmental_contour, plot_matrix, plot_spectrum,
    ContourOptions, MatrixOptions,
};
