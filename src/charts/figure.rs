//! Retained drawing surface.
//!
//! Chart functions never draw pixels directly. They record series, text and
//! axis settings on an [`Axes`] (or a multi-panel [`Figure`]) which the caller
//! owns, and the renderer turns the finished surface into an image. Nothing is
//! global: every drawing operation goes through an explicit surface.

use crate::stats::BoxStats;

/// RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const RED: Rgb = Rgb(255, 0, 0);
pub const GREEN: Rgb = Rgb(0, 128, 0);
pub const FIREBRICK: Rgb = Rgb(178, 34, 34);

/// Colour cycle for successive data series.
pub const PALETTE: [Rgb; 10] = [
    Rgb(31, 119, 180),  // Blue
    Rgb(255, 127, 14),  // Orange
    Rgb(44, 160, 44),   // Green
    Rgb(214, 39, 40),   // Red
    Rgb(148, 103, 189), // Purple
    Rgb(140, 86, 75),   // Brown
    Rgb(227, 119, 194), // Pink
    Rgb(127, 127, 127), // Grey
    Rgb(188, 189, 34),  // Olive
    Rgb(23, 190, 207),  // Cyan
];

pub fn palette_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

impl Scale {
    /// Whether `v` can be placed on an axis of this scale.
    pub fn accepts(self, v: f64) -> bool {
        match self {
            Scale::Linear => v.is_finite(),
            Scale::Log => v.is_finite() && v > 0.0,
        }
    }
}

/// View limits of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limits {
    /// Follow the data. `tight` drops the 5% margin.
    Auto { tight: bool },
    Fixed(f64, f64),
}

impl Default for Limits {
    fn default() -> Self {
        Limits::Auto { tight: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: u32,
    pub dash: LineDash,
    pub alpha: f64,
}

impl LineStyle {
    pub fn solid(color: Rgb) -> Self {
        Self {
            color,
            width: 1,
            dash: LineDash::Solid,
            alpha: 1.0,
        }
    }

    pub fn dashed(color: Rgb) -> Self {
        Self {
            dash: LineDash::Dashed,
            ..Self::solid(color)
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Plus,
    /// Horizontal tick, `_`.
    HTick,
    /// Vertical tick, `|`.
    VTick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub marker: Marker,
    pub size: u32,
    pub color: Rgb,
    pub alpha: f64,
}

impl MarkerStyle {
    pub fn new(marker: Marker, size: u32, color: Rgb) -> Self {
        Self {
            marker,
            size,
            color,
            alpha: 1.0,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One colour-mapped heatmap cell spanning `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub box_line: LineStyle,
    pub whisker: LineStyle,
    pub median: LineStyle,
    pub flier: MarkerStyle,
    pub mean: Option<MarkerStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Line {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Markers {
        points: Vec<(f64, f64)>,
        style: MarkerStyle,
    },
    Cells {
        cells: Vec<Cell>,
        /// Value range mapped onto the colour map.
        range: (f64, f64),
    },
    Box {
        position: f64,
        width: f64,
        stats: BoxStats,
        orientation: Orientation,
        style: BoxStyle,
    },
}

impl Mark {
    /// Every data-space point this mark covers, used for autoscaling.
    pub fn extent_points(&self) -> Vec<(f64, f64)> {
        match self {
            Mark::Line { points, .. } | Mark::Markers { points, .. } => points.clone(),
            Mark::Cells { cells, .. } => cells
                .iter()
                .flat_map(|c| [(c.x.0, c.y.0), (c.x.1, c.y.1)])
                .collect(),
            Mark::Box {
                position,
                width,
                stats,
                orientation,
                ..
            } => {
                let (lo, hi) = stats.extent();
                let (a, b) = (position - width / 2.0, position + width / 2.0);
                match orientation {
                    Orientation::Vertical => vec![(a, lo), (b, hi)],
                    Orientation::Horizontal => vec![(lo, a), (hi, b)],
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub mark: Mark,
    pub label: Option<String>,
}

impl Series {
    pub fn line(points: Vec<(f64, f64)>, style: LineStyle) -> Self {
        Self {
            mark: Mark::Line { points, style },
            label: None,
        }
    }

    pub fn markers(points: Vec<(f64, f64)>, style: MarkerStyle) -> Self {
        Self {
            mark: Mark::Markers { points, style },
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn points(&self) -> &[(f64, f64)] {
        match &self.mark {
            Mark::Line { points, .. } | Mark::Markers { points, .. } => points,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub at: (f64, f64),
    pub size: f64,
    pub color: Rgb,
    pub italic: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Skip the text when its anchor lies outside the view.
    pub clip: bool,
}

impl Annotation {
    pub fn new(text: impl Into<String>, at: (f64, f64)) -> Self {
        Self {
            text: text.into(),
            at,
            size: 12.0,
            color: BLACK,
            italic: false,
            h_align: HAlign::Left,
            v_align: VAlign::Bottom,
            clip: false,
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn clipped(mut self) -> Self {
        self.clip = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Legend {
    pub position: LegendPosition,
    pub font_size: f64,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            position: LegendPosition::UpperRight,
            font_size: 12.0,
        }
    }
}

/// Tick placement policy for one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Ticks {
    /// Nice linear steps, or decades on a log axis.
    Auto,
    /// Exactly these positions and labels.
    Fixed(Vec<(f64, String)>),
    /// Values are Unix seconds; one tick every `interval_days` at midnight.
    Dates {
        interval_days: u32,
        format: String,
        rotated: bool,
    },
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    X,
    Y,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub axis: GridAxis,
    pub style: LineStyle,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            axis: GridAxis::Both,
            style: LineStyle::solid(Rgb(176, 176, 176)).alpha(0.6),
        }
    }
}

/// Independent y axis drawn on the right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryAxis {
    pub label: String,
    pub range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub label: Option<String>,
    pub range: (f64, f64),
}

/// One plotting panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axes {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub x_limits: Limits,
    pub y_limits: Limits,
    pub x_ticks: Ticks,
    pub y_ticks: Ticks,
    /// Labels along the top edge, e.g. per-group counts.
    pub top_ticks: Option<Vec<(f64, String)>>,
    pub series: Vec<Series>,
    pub annotations: Vec<Annotation>,
    pub legend: Option<Legend>,
    pub grid: Option<Grid>,
    pub secondary_y: Option<SecondaryAxis>,
    pub colorbar: Option<ColorBar>,
    pub hide_axes: bool,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Linear
    }
}

impl Default for Ticks {
    fn default() -> Self {
        Ticks::Auto
    }
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_xscale(&mut self, scale: Scale) -> &mut Self {
        self.x_scale = scale;
        self
    }

    pub fn set_yscale(&mut self, scale: Scale) -> &mut Self {
        self.y_scale = scale;
        self
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) -> &mut Self {
        self.x_limits = Limits::Fixed(lo, hi);
        self
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) -> &mut Self {
        self.y_limits = Limits::Fixed(lo, hi);
        self
    }

    /// Follow the data on both axes.
    pub fn autoscale(&mut self, tight: bool) -> &mut Self {
        self.x_limits = Limits::Auto { tight };
        self.y_limits = Limits::Auto { tight };
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    pub fn plot(&mut self, points: Vec<(f64, f64)>, style: LineStyle) -> &mut Self {
        self.add_series(Series::line(points, style))
    }

    pub fn scatter(&mut self, points: Vec<(f64, f64)>, style: MarkerStyle) -> &mut Self {
        self.add_series(Series::markers(points, style))
    }

    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    pub fn show_legend(&mut self, legend: Legend) -> &mut Self {
        self.legend = Some(legend);
        self
    }

    pub fn show_grid(&mut self, grid: Grid) -> &mut Self {
        self.grid = Some(grid);
        self
    }

    /// Labels of the series that would appear in the legend, in draw order.
    /// Empty when no legend is shown.
    pub fn legend_entries(&self) -> Vec<&str> {
        if self.legend.is_none() {
            return Vec::new();
        }
        self.series
            .iter()
            .filter_map(|s| s.label.as_deref())
            .collect()
    }

    /// Current x view limits, resolved against the data plotted so far.
    pub fn x_view(&self) -> (f64, f64) {
        let values = self
            .series
            .iter()
            .flat_map(|s| s.mark.extent_points())
            .map(|(x, _)| x);
        resolve_limits(self.x_limits, self.x_scale, values)
    }

    /// Current y view limits, resolved against the data plotted so far.
    pub fn y_view(&self) -> (f64, f64) {
        let values = self
            .series
            .iter()
            .flat_map(|s| s.mark.extent_points())
            .map(|(_, y)| y);
        resolve_limits(self.y_limits, self.y_scale, values)
    }
}

/// Fraction of the data span added on each side of a non-tight view.
const AUTO_MARGIN: f64 = 0.05;

fn resolve_limits(limits: Limits, scale: Scale, values: impl Iterator<Item = f64>) -> (f64, f64) {
    let tight = match limits {
        Limits::Fixed(lo, hi) => return (lo, hi),
        Limits::Auto { tight } => tight,
    };

    let bounds = values
        .filter(|&v| scale.accepts(v))
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let Some((lo, hi)) = bounds else {
        return match scale {
            Scale::Linear => (0.0, 1.0),
            Scale::Log => (1.0, 10.0),
        };
    };

    match scale {
        Scale::Linear => {
            let (lo, hi) = if lo == hi {
                let pad = if lo == 0.0 { 1.0 } else { lo.abs() * AUTO_MARGIN };
                (lo - pad, hi + pad)
            } else {
                (lo, hi)
            };
            if tight {
                (lo, hi)
            } else {
                let pad = (hi - lo) * AUTO_MARGIN;
                (lo - pad, hi + pad)
            }
        }
        Scale::Log => {
            let (mut a, mut b) = (lo.log10(), hi.log10());
            if a == b {
                a -= AUTO_MARGIN;
                b += AUTO_MARGIN;
            }
            if !tight {
                let pad = (b - a) * AUTO_MARGIN;
                a -= pad;
                b += pad;
            }
            (10f64.powf(a), 10f64.powf(b))
        }
    }
}

/// A stack of panels sharing the figure width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub panels: Vec<Axes>,
    /// Relative panel heights, one per panel.
    pub height_ratios: Vec<u32>,
    /// Preferred pixel size; overrides the configured size when set.
    pub size: Option<(u32, u32)>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn add_panel(&mut self, axes: Axes, height_ratio: u32) -> &mut Self {
        self.panels.push(axes);
        self.height_ratios.push(height_ratio.max(1));
        self
    }
}

impl From<Axes> for Figure {
    fn from(axes: Axes) -> Self {
        let mut figure = Figure::new();
        figure.add_panel(axes, 1);
        figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_limits_ignore_data() {
        let mut ax = Axes::new();
        ax.scatter(vec![(100.0, 100.0)], MarkerStyle::new(Marker::Circle, 4, BLACK));
        ax.set_xlim(0.0, 1.0);
        assert_eq!(ax.x_view(), (0.0, 1.0));
    }

    #[test]
    fn tight_limits_follow_data() {
        let mut ax = Axes::new();
        ax.plot(vec![(1.0, -2.0), (3.0, 4.0)], LineStyle::solid(BLACK));
        ax.autoscale(true);
        assert_eq!(ax.x_view(), (1.0, 3.0));
        assert_eq!(ax.y_view(), (-2.0, 4.0));
    }

    #[test]
    fn loose_limits_add_margin() {
        let mut ax = Axes::new();
        ax.plot(vec![(0.0, 0.0), (10.0, 10.0)], LineStyle::solid(BLACK));
        let (lo, hi) = ax.x_view();
        assert!((lo + 0.5).abs() < 1e-12);
        assert!((hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn log_view_skips_non_positive() {
        let mut ax = Axes::new();
        ax.set_xscale(Scale::Log).autoscale(true);
        ax.plot(vec![(-1.0, 1.0), (0.1, 1.0), (10.0, 1.0)], LineStyle::solid(BLACK));
        let (lo, hi) = ax.x_view();
        assert!((lo - 0.1).abs() < 1e-12);
        assert!((hi - 10.0).abs() < 1e-9);
    }

    #[test]
    fn legend_entries_need_a_legend() {
        let mut ax = Axes::new();
        ax.add_series(
            Series::markers(vec![(1.0, 1.0)], MarkerStyle::new(Marker::Circle, 4, BLACK))
                .with_label("a"),
        );
        ax.plot(vec![(0.0, 0.0), (1.0, 1.0)], LineStyle::solid(BLACK));
        assert!(ax.legend_entries().is_empty());
        ax.show_legend(Legend::default());
        assert_eq!(ax.legend_entries(), vec!["a"]);
    }

    #[test]
    fn box_extent_covers_outliers() {
        let stats = crate::stats::StatsCalculator::box_stats(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap();
        let style = BoxStyle {
            box_line: LineStyle::solid(BLACK),
            whisker: LineStyle::dashed(BLACK),
            median: LineStyle::solid(FIREBRICK),
            flier: MarkerStyle::new(Marker::Plus, 4, RED),
            mean: None,
        };
        let mark = Mark::Box {
            position: 1.0,
            width: 0.5,
            stats,
            orientation: Orientation::Vertical,
            style,
        };
        assert_eq!(mark.extent_points(), vec![(0.75, 1.0), (1.25, 50.0)]);
    }
}
