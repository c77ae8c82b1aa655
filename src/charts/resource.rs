//! Wave resource charts: spectra, elevation records, capture matrices and
//! environmental contours.

use crate::charts::figure::{
    palette_color, Annotation, Axes, Cell, ColorBar, Grid, HAlign, Legend, LegendPosition,
    LineStyle, Mark, Marker, MarkerStyle, Series, Ticks, VAlign, BLUE,
};
use crate::charts::format::format_general;
use crate::data::{CaptureMatrix, ElevationSeries, Spectrum, TimeIndex};
use crate::error::{GraphicsError, Result};
use std::f64::consts::PI;
use tracing::debug;

/// Plain x/y line plot with a grid, shared by the spectrum and elevation
/// charts.
fn xy_plot<'a>(
    ax: &'a mut Axes,
    x: &[f64],
    columns: impl Iterator<Item = Vec<f64>>,
    x_label: &str,
    y_label: &str,
) -> &'a mut Axes {
    for (i, y) in columns.enumerate() {
        let points = x.iter().copied().zip(y).collect();
        ax.plot(points, LineStyle::solid(palette_color(i)).width(2));
    }
    ax.show_grid(Grid::default());
    ax.set_xlabel(x_label);
    ax.set_ylabel(y_label);
    ax
}

/// Plot spectral density against angular frequency.
///
/// A sample `(f [Hz], S [m²/Hz])` is drawn at `(2πf, S/2π)`.
pub fn plot_spectrum<'a>(spectrum: &Spectrum, ax: &'a mut Axes) -> Result<&'a mut Axes> {
    let n = spectrum.frequency.len();
    if let Some(c) = spectrum.columns.iter().find(|c| c.values.len() != n) {
        return Err(GraphicsError::shape("spectrum columns and frequency index", n, c.values.len()));
    }

    let omega: Vec<f64> = spectrum.frequency.iter().map(|f| f * 2.0 * PI).collect();
    let densities = spectrum
        .columns
        .iter()
        .map(|c| c.values.iter().map(|s| s / (2.0 * PI)).collect());
    debug!(columns = spectrum.columns.len(), samples = n, "plotting spectrum");

    Ok(xy_plot(
        ax,
        &omega,
        densities,
        "omega [rad/s]",
        "Spectral density [m²s/rad]",
    ))
}

/// Plot surface elevation against time.
pub fn plot_elevation_timeseries<'a>(
    eta: &ElevationSeries,
    ax: &'a mut Axes,
) -> Result<&'a mut Axes> {
    let n = eta.index.len();
    if let Some(c) = eta.columns.iter().find(|c| c.values.len() != n) {
        return Err(GraphicsError::shape("elevation columns and time index", n, c.values.len()));
    }

    let x = eta.index.positions();
    xy_plot(
        ax,
        &x,
        eta.columns.iter().map(|c| c.values.clone()),
        "Time",
        "η [m]",
    );
    if matches!(eta.index, TimeIndex::Datetime(_)) {
        ax.x_ticks = Ticks::Dates {
            interval_days: 1,
            format: "%m-%d %H:%M".to_string(),
            rotated: false,
        };
    }
    Ok(ax)
}

/// Options for [`plot_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOptions {
    pub x_label: String,
    pub y_label: String,
    /// Colorbar label.
    pub z_label: Option<String>,
    pub show_values: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            x_label: "Te".to_string(),
            y_label: "Hm0".to_string(),
            z_label: None,
            show_values: true,
        }
    }
}

/// Plot a matrix as a heatmap with a colorbar.
///
/// Row 0 sits at the bottom. Empty (NaN) bins are left blank.
pub fn plot_matrix<'a>(
    matrix: &CaptureMatrix,
    options: &MatrixOptions,
    ax: &'a mut Axes,
) -> Result<&'a mut Axes> {
    if matrix.values.len() != matrix.y_labels.len() {
        return Err(GraphicsError::shape(
            "matrix rows and row labels",
            matrix.y_labels.len(),
            matrix.values.len(),
        ));
    }
    if let Some(row) = matrix.values.iter().find(|r| r.len() != matrix.x_labels.len()) {
        return Err(GraphicsError::shape(
            "matrix columns and column labels",
            matrix.x_labels.len(),
            row.len(),
        ));
    }

    let range = matrix.value_range().unwrap_or((0.0, 1.0));
    let mut cells = Vec::new();
    let mut labels = Vec::new();
    for (j, row) in matrix.values.iter().enumerate() {
        for (i, &value) in row.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            let (x, y) = (i as f64, j as f64);
            cells.push(Cell {
                x: (x - 0.5, x + 0.5),
                y: (y - 0.5, y + 0.5),
                value,
            });
            if options.show_values {
                labels.push(
                    Annotation::new(format!("{:.2}", value), (x, y))
                        .align(HAlign::Center, VAlign::Center),
                );
            }
        }
    }
    debug!(cells = cells.len(), "plotting matrix");

    ax.add_series(Series {
        mark: Mark::Cells { cells, range },
        label: None,
    });
    for label in labels {
        ax.annotate(label);
    }

    let nx = matrix.x_labels.len() as f64;
    let ny = matrix.y_labels.len() as f64;
    ax.set_xlim(-0.5, nx - 0.5);
    ax.set_ylim(-0.5, ny - 0.5);
    ax.x_ticks = Ticks::Fixed(
        matrix
            .x_labels
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, format_general(*v)))
            .collect(),
    );
    ax.y_ticks = Ticks::Fixed(
        matrix
            .y_labels
            .iter()
            .enumerate()
            .map(|(j, v)| (j as f64, format_general(*v)))
            .collect(),
    );
    ax.colorbar = Some(ColorBar {
        label: options.z_label.clone(),
        range,
    });
    ax.set_xlabel(options.x_label.as_str());
    ax.set_ylabel(options.y_label.as_str());

    Ok(ax)
}

/// Options for [`plot_environmental_contour`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourOptions {
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Legend label of the observed data, e.g. `"Buoy 46022"`.
    pub data_label: String,
    /// One label per contour, e.g. `"100-year contour"`.
    pub contour_labels: Option<Vec<String>>,
}

/// Overlay observed `(x1, x2)` data on one or more environmental contours.
///
/// `x1_contour[k]` and `x2_contour[k]` are the coordinates of contour `k`.
pub fn plot_environmental_contour<'a>(
    x1: &[f64],
    x2: &[f64],
    x1_contour: &[Vec<f64>],
    x2_contour: &[Vec<f64>],
    options: &ContourOptions,
    ax: &'a mut Axes,
) -> Result<&'a mut Axes> {
    if x1.len() != x2.len() {
        return Err(GraphicsError::shape("x1 and x2", x1.len(), x2.len()));
    }
    if x1_contour.len() != x2_contour.len() {
        return Err(GraphicsError::shape(
            "contour dimensions",
            x1_contour.len(),
            x2_contour.len(),
        ));
    }
    for (a, b) in x1_contour.iter().zip(x2_contour) {
        if a.len() != b.len() {
            return Err(GraphicsError::shape("x1_contour and x2_contour", a.len(), b.len()));
        }
    }
    let n_contours = x1_contour.len();
    if let Some(labels) = &options.contour_labels {
        if labels.len() != n_contours {
            return Err(GraphicsError::LabelCount {
                expected: n_contours,
                got: labels.len(),
            });
        }
    }
    debug!(contours = n_contours, samples = x1.len(), "plotting environmental contour");

    for (k, (cx, cy)) in x1_contour.iter().zip(x2_contour).enumerate() {
        let points = cx.iter().copied().zip(cy.iter().copied()).collect();
        let mut series = Series::line(points, LineStyle::solid(palette_color(k)).width(2));
        if let Some(label) = options.contour_labels.as_ref().and_then(|l| l.get(k)) {
            series = series.with_label(label.as_str());
        }
        ax.add_series(series);
    }

    let data = x1.iter().copied().zip(x2.iter().copied()).collect();
    ax.add_series(
        Series::markers(data, MarkerStyle::new(Marker::Circle, 3, BLUE).alpha(0.1))
            .with_label(options.data_label.as_str()),
    );

    ax.show_legend(Legend {
        position: LegendPosition::LowerRight,
        ..Legend::default()
    });
    if let Some(label) = &options.x_label {
        ax.set_xlabel(label.as_str());
    }
    if let Some(label) = &options.y_label {
        ax.set_ylabel(label.as_str());
    }
    Ok(ax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NamedColumn;
    use pretty_assertions::assert_eq;

    #[test]
    fn spectrum_is_scaled_to_angular_frequency() {
        let spectrum = Spectrum::new(
            vec![0.5, 1.0],
            vec![NamedColumn::new("S", vec![2.0 * PI, 4.0 * PI])],
        )
        .unwrap();
        let mut ax = Axes::new();
        plot_spectrum(&spectrum, &mut ax).unwrap();

        assert_eq!(ax.series.len(), 1);
        let pts = ax.series[0].points();
        assert!((pts[0].0 - PI).abs() < 1e-12);
        assert!((pts[0].1 - 1.0).abs() < 1e-12);
        assert!((pts[1].0 - 2.0 * PI).abs() < 1e-12);
        assert!((pts[1].1 - 2.0).abs() < 1e-12);
        assert_eq!(ax.x_label.as_deref(), Some("omega [rad/s]"));
        assert!(ax.grid.is_some());
    }

    #[test]
    fn one_line_per_elevation_column() {
        let eta = ElevationSeries::new(
            TimeIndex::Seconds(vec![0.0, 0.5, 1.0]),
            vec![
                NamedColumn::new("probe1", vec![0.1, 0.0, -0.1]),
                NamedColumn::new("probe2", vec![0.2, 0.0, -0.2]),
            ],
        )
        .unwrap();
        let mut ax = Axes::new();
        plot_elevation_timeseries(&eta, &mut ax).unwrap();
        assert_eq!(ax.series.len(), 2);
        assert_eq!(ax.series[1].points()[2], (1.0, -0.2));
        assert_eq!(ax.y_label.as_deref(), Some("η [m]"));
        assert_eq!(ax.x_ticks, Ticks::Auto);
    }

    #[test]
    fn matrix_skips_empty_bins() {
        let m = CaptureMatrix::new(
            vec![6.5, 7.5],
            vec![0.5, 1.5],
            vec![vec![1.0, f64::NAN], vec![3.0, 4.0]],
        )
        .unwrap();
        let mut ax = Axes::new();
        let opts = MatrixOptions {
            z_label: Some("Capture length [m]".to_string()),
            ..MatrixOptions::default()
        };
        plot_matrix(&m, &opts, &mut ax).unwrap();

        let Mark::Cells { cells, range } = &ax.series[0].mark else {
            panic!("expected heatmap cells");
        };
        assert_eq!(cells.len(), 3);
        assert_eq!(*range, (1.0, 4.0));
        let texts: Vec<&str> = ax.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["1.00", "3.00", "4.00"]);
        assert_eq!(ax.annotations[2].at, (1.0, 1.0));
        assert_eq!(
            ax.x_ticks,
            Ticks::Fixed(vec![(0.0, "6.5".to_string()), (1.0, "7.5".to_string())])
        );
        assert_eq!(ax.x_label.as_deref(), Some("Te"));
        assert_eq!(
            ax.colorbar.as_ref().and_then(|c| c.label.as_deref()),
            Some("Capture length [m]")
        );
    }

    #[test]
    fn matrix_values_can_be_hidden() {
        let m = CaptureMatrix::new(vec![1.0], vec![1.0], vec![vec![2.0]]).unwrap();
        let mut ax = Axes::new();
        let opts = MatrixOptions {
            show_values: false,
            ..MatrixOptions::default()
        };
        plot_matrix(&m, &opts, &mut ax).unwrap();
        assert!(ax.annotations.is_empty());
    }

    #[test]
    fn contour_overlay() {
        let mut ax = Axes::new();
        let opts = ContourOptions {
            x_label: Some("Te [s]".to_string()),
            y_label: Some("Hm0 [m]".to_string()),
            data_label: "Buoy 46022".to_string(),
            contour_labels: Some(vec!["100-year contour".to_string()]),
        };
        plot_environmental_contour(
            &[8.0, 9.0],
            &[1.0, 2.0],
            &[vec![5.0, 10.0, 15.0]],
            &[vec![0.0, 6.0, 0.0]],
            &opts,
            &mut ax,
        )
        .unwrap();
        assert_eq!(ax.legend_entries(), vec!["100-year contour", "Buoy 46022"]);
        assert_eq!(ax.legend.map(|l| l.position), Some(LegendPosition::LowerRight));
    }

    #[test]
    fn contour_label_count_must_match() {
        let mut ax = Axes::new();
        let opts = ContourOptions {
            data_label: "data".to_string(),
            contour_labels: Some(vec!["a".to_string(), "b".to_string()]),
            ..ContourOptions::default()
        };
        let err = plot_environmental_contour(
            &[1.0],
            &[1.0],
            &[vec![1.0, 2.0]],
            &[vec![1.0, 2.0]],
            &opts,
            &mut ax,
        )
        .unwrap_err();
        assert!(matches!(err, GraphicsError::LabelCount { expected: 1, got: 2 }));
        assert!(ax.series.is_empty());
    }

    #[test]
    fn contour_dimensions_must_match() {
        let mut ax = Axes::new();
        let opts = ContourOptions {
            data_label: "data".to_string(),
            ..ContourOptions::default()
        };
        let err = plot_environmental_contour(
            &[1.0],
            &[1.0],
            &[vec![1.0, 2.0], vec![3.0]],
            &[vec![1.0, 2.0]],
            &opts,
            &mut ax,
        )
        .unwrap_err();
        assert!(matches!(err, GraphicsError::ShapeMismatch { .. }));
    }
}
