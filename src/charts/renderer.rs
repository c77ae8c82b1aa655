//! Figure Renderer
//! Draws a finished [`Figure`] with plotters, to SVG or PNG.
//!
//! Every panel is drawn in display space: a log axis becomes `log10(v)` on a
//! plain linear coordinate, so all panels share one coordinate type. Tick
//! positions and labels are computed here and handed to plotters through
//! [`TickAxis`], and grid lines are drawn by hand so they can be dashed.

use crate::charts::figure::{
    Axes, BoxStyle, ColorBar, Figure, GridAxis, HAlign, LegendPosition, LineDash, LineStyle, Mark,
    Marker, MarkerStyle, Orientation, Rgb, Scale, Ticks, VAlign,
};
use crate::charts::format::format_general;
use crate::config::{FigureConfig, OutputFormat};
use crate::error::{GraphicsError, Result};
use crate::stats::BoxStats;
use chrono::DateTime;
use plotters::chart::SeriesAnno;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::colors::colormaps::ViridisRGB;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

// Label area sizes (pixels)
const X_LABEL_AREA: u32 = 45;
const ROTATED_X_LABEL_AREA: u32 = 110;
const Y_LABEL_AREA: u32 = 70;
const TOP_LABEL_AREA: u32 = 30;
const COLORBAR_WIDTH: u32 = 120;
const COLORBAR_STEPS: usize = 100;

/// Target number of ticks on an automatic linear axis.
const AUTO_TICKS: usize = 8;
const MAX_DATE_TICKS: usize = 200;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// Dash length and gap, in pixels.
const DASH: (u32, u32) = (8, 5);

type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<TickAxis, TickAxis>>;

/// Linear `f64` axis whose key points are exactly the ticks computed for it.
#[derive(Clone)]
struct TickAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickAxis {
    fn new((lo, hi): (f64, f64), ticks: &[(f64, String)]) -> Self {
        Self {
            inner: (lo..hi).into(),
            ticks: positions(ticks),
        }
    }
}

impl Ranged for TickAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

impl ValueFormatter<f64> for TickAxis {
    fn format(value: &f64) -> String {
        format_general(*value)
    }
}

fn draw_error<E: std::fmt::Display>(err: E) -> GraphicsError {
    GraphicsError::Draw(err.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn line_shape(style: &LineStyle) -> ShapeStyle {
    rgb(style.color).mix(style.alpha).stroke_width(style.width)
}

pub struct FigureRenderer {
    config: FigureConfig,
}

impl FigureRenderer {
    pub fn new(config: FigureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    /// Pixel size of `figure`: its own preferred size, else the configured one.
    pub fn size_of(&self, figure: &Figure) -> (u32, u32) {
        figure
            .size
            .unwrap_or((self.config.width, self.config.height))
    }

    /// Write `figure` to `path`, picking the format from the file extension.
    /// A path without extension uses the configured format.
    pub fn render(&self, figure: &Figure, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|e| e.to_str()) {
            None => self.config.format,
            Some(ext) => OutputFormat::from_path(path)
                .ok_or_else(|| GraphicsError::UnsupportedFormat(ext.to_string()))?,
        };
        match format {
            OutputFormat::Svg => self.render_svg(figure, path),
            OutputFormat::Png => self.render_png(figure, path),
        }
    }

    pub fn render_svg(&self, figure: &Figure, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let root = SVGBackend::new(path, self.size_of(figure)).into_drawing_area();
        self.draw_figure(&root, figure)?;
        root.present().map_err(draw_error)?;
        info!(path = %path.display(), "SVG figure written");
        Ok(())
    }

    pub fn render_png(&self, figure: &Figure, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let root = BitMapBackend::new(path, self.size_of(figure)).into_drawing_area();
        self.draw_figure(&root, figure)?;
        root.present().map_err(draw_error)?;
        info!(path = %path.display(), "PNG figure written");
        Ok(())
    }

    /// Render to an in-memory SVG document.
    pub fn render_svg_string(&self, figure: &Figure) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size_of(figure)).into_drawing_area();
            self.draw_figure(&root, figure)?;
            root.present().map_err(draw_error)?;
        }
        Ok(svg)
    }

    fn font(&self, base: f64) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::from(self.config.font_family.as_str()),
            self.config.font_px(base),
            FontStyle::Normal,
        )
    }

    fn draw_figure<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
    ) -> Result<()> {
        let [r, g, b] = self.config.background;
        root.fill(&RGBColor(r, g, b)).map_err(draw_error)?;

        let mut area = root.clone();
        if let Some(title) = &figure.title {
            area = area.titled(title, self.font(24.0)).map_err(draw_error)?;
        }
        if let Some(subtitle) = &figure.subtitle {
            area = area.titled(subtitle, self.font(16.0)).map_err(draw_error)?;
        }
        debug!(panels = figure.panels.len(), "drawing figure");

        let ratio = |i: usize| figure.height_ratios.get(i).copied().unwrap_or(1).max(1);
        let total: u32 = (0..figure.panels.len()).map(ratio).sum();
        let (_, height) = area.dim_in_pixel();

        let mut rest = area;
        for (i, ax) in figure.panels.iter().enumerate() {
            if i + 1 == figure.panels.len() {
                self.draw_panel(&rest, ax)?;
                break;
            }
            let (top, bottom) = rest.split_vertically(height * ratio(i) / total);
            self.draw_panel(&top, ax)?;
            rest = bottom;
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, ax: &Axes) -> Result<()> {
        let (width, _) = area.dim_in_pixel();
        let (plot_area, colorbar_area) = match &ax.colorbar {
            Some(bar) if width > COLORBAR_WIDTH * 2 => {
                let (left, right) = area.split_horizontally(width - COLORBAR_WIDTH);
                (left, Some((right, bar)))
            }
            _ => (area.clone(), None),
        };

        let x_view = ax.x_view();
        let y_view = ax.y_view();
        let view = View {
            x: display_range(ax.x_scale, x_view),
            y: display_range(ax.y_scale, y_view),
        };
        let (x_ticks, y_ticks) = if ax.hide_axes {
            (Vec::new(), Vec::new())
        } else {
            (
                tick_marks(&ax.x_ticks, ax.x_scale, x_view),
                tick_marks(&ax.y_ticks, ax.y_scale, y_view),
            )
        };
        let rotated = matches!(ax.x_ticks, Ticks::Dates { rotated: true, .. });

        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(15);
        if let Some(title) = &ax.title {
            builder.caption(title, self.font(16.0));
        }
        if !ax.hide_axes {
            builder
                .x_label_area_size(if rotated { ROTATED_X_LABEL_AREA } else { X_LABEL_AREA })
                .y_label_area_size(Y_LABEL_AREA);
            if ax.secondary_y.is_some() {
                builder.right_y_label_area_size(Y_LABEL_AREA);
            }
            if ax.top_ticks.is_some() {
                builder.top_x_label_area_size(TOP_LABEL_AREA);
            }
        }
        let mut chart = builder
            .build_cartesian_2d(
                TickAxis::new(view.x, &x_ticks),
                TickAxis::new(view.y, &y_ticks),
            )
            .map_err(draw_error)?;

        if !ax.hide_axes {
            let x_fmt = |v: &f64| label_at(&x_ticks, *v);
            let y_fmt = |v: &f64| label_at(&y_ticks, *v);
            let label_font = self.font(12.0);
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(label_font.clone())
                .axis_desc_style(self.font(14.0));
            if rotated {
                mesh.x_label_style(label_font.transform(FontTransform::Rotate90));
            }
            if let Some(label) = &ax.x_label {
                mesh.x_desc(label.as_str());
            }
            if let Some(label) = &ax.y_label {
                mesh.y_desc(label.as_str());
            }
            mesh.draw().map_err(draw_error)?;
        }

        if let Some(grid) = &ax.grid {
            if matches!(grid.axis, GridAxis::X | GridAxis::Both) {
                for (x, _) in &x_ticks {
                    draw_line_run(&mut chart, vec![(*x, view.y.0), (*x, view.y.1)], &grid.style)?;
                }
            }
            if matches!(grid.axis, GridAxis::Y | GridAxis::Both) {
                for (y, _) in &y_ticks {
                    draw_line_run(&mut chart, vec![(view.x.0, *y), (view.x.1, *y)], &grid.style)?;
                }
            }
        }

        for series in &ax.series {
            self.draw_mark(&mut chart, ax, &view, &series.mark, series.label.as_deref())?;
        }
        self.draw_annotations(&mut chart, ax, &view)?;

        if let Some(legend) = &ax.legend {
            if ax.series.iter().any(|s| s.label.is_some()) {
                chart
                    .configure_series_labels()
                    .position(series_label_position(legend.position))
                    .label_font(self.font(legend.font_size))
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK.mix(0.3))
                    .draw()
                    .map_err(draw_error)?;
            }
        }

        if !ax.hide_axes && (ax.secondary_y.is_some() || ax.top_ticks.is_some()) {
            let top = ax
                .top_ticks
                .as_ref()
                .map(|marks| fixed_ticks(marks, ax.x_scale, x_view))
                .unwrap_or_default();
            let (range, right) = match &ax.secondary_y {
                Some(secondary) => {
                    let (lo, hi) = display_range(Scale::Linear, secondary.range);
                    let ticks = linear_ticks(lo, hi)
                        .into_iter()
                        .map(|v| (v, format_general(v)))
                        .collect();
                    ((lo, hi), ticks)
                }
                None => (view.y, Vec::new()),
            };

            let mut dual = chart.set_secondary_coord(
                TickAxis::new(view.x, &top),
                TickAxis::new(range, &right),
            );
            let top_fmt = |v: &f64| label_at(&top, *v);
            let right_fmt = |v: &f64| label_at(&right, *v);
            let mut axes = dual.configure_secondary_axes();
            axes.x_label_formatter(&top_fmt)
                .y_label_formatter(&right_fmt)
                .label_style(self.font(10.0));
            if let Some(secondary) = &ax.secondary_y {
                axes.y_desc(secondary.label.as_str());
            }
            axes.draw().map_err(draw_error)?;
        }

        if let Some((area, bar)) = colorbar_area {
            self.draw_colorbar(&area, bar)?;
        }
        Ok(())
    }

    fn draw_mark<DB: DrawingBackend>(
        &self,
        chart: &mut PanelChart<'_, DB>,
        ax: &Axes,
        view: &View,
        mark: &Mark,
        label: Option<&str>,
    ) -> Result<()> {
        match mark {
            Mark::Line { points, style } => {
                let display: Vec<Option<(f64, f64)>> =
                    points.iter().map(|&p| to_display(ax, p)).collect();
                for (i, run) in clip_polyline(&display, view).into_iter().enumerate() {
                    let anno = draw_line_run(chart, run, style)?;
                    if let (0, Some(label)) = (i, label) {
                        let shape = line_shape(style);
                        anno.label(label).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], shape)
                        });
                    }
                }
            }
            Mark::Markers { points, style } => {
                let visible: Vec<(f64, f64)> = points
                    .iter()
                    .filter_map(|&p| to_display(ax, p))
                    .filter(|&p| view.contains(p))
                    .collect();
                let anno = draw_markers(chart, visible, style)?;
                if let Some(label) = label {
                    let color = rgb(style.color).mix(style.alpha.max(0.5));
                    let size = style.size.clamp(2, 5);
                    anno.label(label)
                        .legend(move |(x, y)| Circle::new((x + 10, y), size, color.filled()));
                }
            }
            Mark::Cells { cells, range } => {
                let rects: Vec<_> = cells
                    .iter()
                    .filter_map(|c| {
                        let a = to_display(ax, (c.x.0, c.y.0))?;
                        let b = to_display(ax, (c.x.1, c.y.1))?;
                        let color = ViridisRGB.get_color(normalize(c.value, *range));
                        Some(Rectangle::new([a, b], color.filled()))
                    })
                    .collect();
                chart.draw_series(rects).map_err(draw_error)?;
            }
            Mark::Box {
                position,
                width,
                stats,
                orientation,
                style,
            } => {
                for part in box_marks(*position, *width, stats, *orientation, style) {
                    self.draw_mark(chart, ax, view, &part, None)?;
                }
            }
        }
        Ok(())
    }

    fn draw_annotations<DB: DrawingBackend>(
        &self,
        chart: &mut PanelChart<'_, DB>,
        ax: &Axes,
        view: &View,
    ) -> Result<()> {
        for note in &ax.annotations {
            let Some(anchor) = to_display(ax, note.at) else {
                continue;
            };
            if note.clip && !view.contains(anchor) {
                continue;
            }
            let size = self.config.font_px(note.size);
            let slant = if note.italic {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            };
            let style = FontDesc::new(FontFamily::from(self.config.font_family.as_str()), size, slant)
                .color(&rgb(note.color))
                .pos(text_pos(note.h_align, note.v_align));

            let lines: Vec<&str> = note.text.lines().collect();
            let line_height = (size * 1.2).round() as i32;
            let n = lines.len() as i32;
            chart
                .draw_series(lines.iter().enumerate().map(|(i, line)| {
                    let dy = line_offset(i as i32, n, line_height, note.v_align);
                    EmptyElement::at(anchor) + Text::new(line.to_string(), (0, dy), style.clone())
                }))
                .map_err(draw_error)?;
        }
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        bar: &ColorBar,
    ) -> Result<()> {
        let (lo, hi) = display_range(Scale::Linear, bar.range);
        let ticks: Vec<(f64, String)> = linear_ticks(lo, hi)
            .into_iter()
            .map(|v| (v, format_general(v)))
            .collect();

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .set_label_area_size(LabelAreaPosition::Right, 60)
            .build_cartesian_2d(TickAxis::new((0.0, 1.0), &[]), TickAxis::new((lo, hi), &ticks))
            .map_err(draw_error)?;

        let fmt = |v: &f64| label_at(&ticks, *v);
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .disable_x_axis()
            .y_label_formatter(&fmt)
            .label_style(self.font(10.0));
        if let Some(label) = &bar.label {
            mesh.y_desc(label.as_str()).axis_desc_style(self.font(12.0));
        }
        mesh.draw().map_err(draw_error)?;

        let step = (hi - lo) / COLORBAR_STEPS as f64;
        chart
            .draw_series((0..COLORBAR_STEPS).map(|i| {
                let y = lo + step * i as f64;
                let color = ViridisRGB.get_color(normalize(y + step / 2.0, (lo, hi)));
                Rectangle::new([(0.0, y), (1.0, y + step)], color.filled())
            }))
            .map_err(draw_error)?;
        Ok(())
    }
}

fn draw_line_run<'c, 'a, DB: DrawingBackend>(
    chart: &'c mut PanelChart<'a, DB>,
    run: Vec<(f64, f64)>,
    style: &LineStyle,
) -> Result<&'c mut SeriesAnno<'a, DB>> {
    let shape = line_shape(style);
    match style.dash {
        LineDash::Solid => chart.draw_series(LineSeries::new(run, shape)),
        LineDash::Dashed => chart.draw_series(DashedLineSeries::new(run, DASH.0, DASH.1, shape)),
    }
    .map_err(draw_error)
}

fn draw_markers<'c, 'a, DB: DrawingBackend>(
    chart: &'c mut PanelChart<'a, DB>,
    points: Vec<(f64, f64)>,
    style: &MarkerStyle,
) -> Result<&'c mut SeriesAnno<'a, DB>> {
    let color = rgb(style.color).mix(style.alpha);
    let s = style.size as i32;
    let stroke = color.stroke_width(1);
    let thick = color.stroke_width(2);
    match style.marker {
        Marker::Circle => {
            chart.draw_series(points.into_iter().map(|c| Circle::new(c, style.size, color.filled())))
        }
        Marker::Plus => chart.draw_series(points.into_iter().map(|c| {
            EmptyElement::at(c)
                + PathElement::new(vec![(-s, 0), (s, 0)], stroke)
                + PathElement::new(vec![(0, -s), (0, s)], stroke)
        })),
        Marker::HTick => chart.draw_series(
            points
                .into_iter()
                .map(|c| EmptyElement::at(c) + PathElement::new(vec![(-s, 0), (s, 0)], thick)),
        ),
        Marker::VTick => chart.draw_series(
            points
                .into_iter()
                .map(|c| EmptyElement::at(c) + PathElement::new(vec![(0, -s), (0, s)], thick)),
        ),
    }
    .map_err(draw_error)
}

fn series_label_position(position: LegendPosition) -> SeriesLabelPosition {
    match position {
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
    }
}

fn text_pos(h: HAlign, v: VAlign) -> Pos {
    let h = match h {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    };
    let v = match v {
        VAlign::Top => VPos::Top,
        VAlign::Center => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    };
    Pos::new(h, v)
}

/// Pixel offset of line `i` of an `n`-line text block so that the block as a
/// whole honours the vertical anchor.
fn line_offset(i: i32, n: i32, line_height: i32, align: VAlign) -> i32 {
    match align {
        VAlign::Top => i * line_height,
        VAlign::Bottom => -(n - 1 - i) * line_height,
        VAlign::Center => i * line_height - (n - 1) * line_height / 2,
    }
}

/// Visible rectangle in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct View {
    x: (f64, f64),
    y: (f64, f64),
}

impl View {
    fn contains(&self, (x, y): (f64, f64)) -> bool {
        let (x0, x1) = ordered(self.x);
        let (y0, y1) = ordered(self.y);
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    (a.min(b), a.max(b))
}

/// Position of `v` on an axis of `scale`, if it can be shown at all.
fn to_axis(scale: Scale, v: f64) -> Option<f64> {
    if !scale.accepts(v) {
        return None;
    }
    Some(match scale {
        Scale::Linear => v,
        Scale::Log => v.log10(),
    })
}

fn to_display(ax: &Axes, (x, y): (f64, f64)) -> Option<(f64, f64)> {
    Some((to_axis(ax.x_scale, x)?, to_axis(ax.y_scale, y)?))
}

/// Display coordinates of a view range, widened when degenerate.
fn display_range(scale: Scale, (lo, hi): (f64, f64)) -> (f64, f64) {
    match (to_axis(scale, lo), to_axis(scale, hi)) {
        (Some(a), Some(b)) if a == b => (a - 0.5, b + 0.5),
        (Some(a), Some(b)) => (a, b),
        _ => (0.0, 1.0),
    }
}

fn normalize(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if !(hi > lo) || value.is_nan() {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

fn positions(ticks: &[(f64, String)]) -> Vec<f64> {
    ticks.iter().map(|(p, _)| *p).collect()
}

fn label_at(ticks: &[(f64, String)], v: f64) -> String {
    ticks
        .iter()
        .find(|(p, _)| (p - v).abs() <= 1e-9 * p.abs().max(1.0))
        .map(|(_, label)| label.clone())
        .unwrap_or_default()
}

/// Tick positions (display space) and labels for one axis.
fn tick_marks(ticks: &Ticks, scale: Scale, view: (f64, f64)) -> Vec<(f64, String)> {
    let (lo, hi) = ordered(view);
    match ticks {
        Ticks::Hidden => Vec::new(),
        Ticks::Fixed(marks) => fixed_ticks(marks, scale, (lo, hi)),
        Ticks::Dates {
            interval_days,
            format,
            ..
        } => date_ticks(lo, hi, *interval_days, format),
        Ticks::Auto => match scale {
            Scale::Linear => linear_ticks(lo, hi)
                .into_iter()
                .map(|v| (v, format_general(v)))
                .collect(),
            Scale::Log => log_ticks(lo, hi),
        },
    }
}

fn fixed_ticks(marks: &[(f64, String)], scale: Scale, view: (f64, f64)) -> Vec<(f64, String)> {
    let (lo, hi) = ordered(view);
    marks
        .iter()
        .filter(|(v, _)| *v >= lo && *v <= hi)
        .filter_map(|(v, label)| Some((to_axis(scale, *v)?, label.clone())))
        .collect()
}

/// Multiples of a nice step inside `[lo, hi]`.
fn linear_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite() && hi > lo) {
        return Vec::new();
    }
    let step = nice_step(hi - lo, AUTO_TICKS);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            if v.abs() < step * 1e-9 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

/// Decades inside `[lo, hi]`, at their log10 position. Falls back to linear
/// steps when the range spans less than one decade.
fn log_ticks(lo: f64, hi: f64) -> Vec<(f64, String)> {
    if !(lo > 0.0 && hi > lo) {
        return Vec::new();
    }
    let first = (lo.log10() - 1e-9).ceil() as i32;
    let last = (hi.log10() + 1e-9).floor() as i32;
    if first > last {
        return linear_ticks(lo, hi)
            .into_iter()
            .filter(|v| *v > 0.0)
            .map(|v| (v.log10(), format_general(v)))
            .collect();
    }
    (first..=last)
        .map(|e| (f64::from(e), format_general(10f64.powi(e))))
        .collect()
}

/// Midnights every `interval_days` days from the first one at or after `lo`.
fn date_ticks(lo: f64, hi: f64, interval_days: u32, format: &str) -> Vec<(f64, String)> {
    if !(lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }
    let step = f64::from(interval_days.max(1)) * SECONDS_PER_DAY;
    let mut t = (lo / SECONDS_PER_DAY).ceil() * SECONDS_PER_DAY;
    let mut ticks = Vec::new();
    while t <= hi && ticks.len() < MAX_DATE_TICKS {
        if let Some(dt) = DateTime::from_timestamp(t as i64, 0) {
            ticks.push((t, dt.naive_utc().format(format).to_string()));
        }
        t += step;
    }
    ticks
}

/// Round a raw step to 1, 2 or 5 times a power of ten.
fn nice_step(range: f64, target_steps: usize) -> f64 {
    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Liang-Barsky clip of segment `a`-`b` against `view`.
fn clip_segment(a: (f64, f64), b: (f64, f64), view: &View) -> Option<((f64, f64), (f64, f64))> {
    let (x_min, x_max) = ordered(view.x);
    let (y_min, y_max) = ordered(view.y);
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [
        (-dx, a.0 - x_min),
        (dx, x_max - a.0),
        (-dy, a.1 - y_min),
        (dy, y_max - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
}

/// Split a polyline into visible runs. `None` points break the line.
fn clip_polyline(points: &[Option<(f64, f64)>], view: &View) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut flush = |current: &mut Vec<(f64, f64)>| {
        if current.len() >= 2 {
            runs.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for pair in points.windows(2) {
        let (Some(a), Some(b)) = (pair[0], pair[1]) else {
            flush(&mut current);
            continue;
        };
        match clip_segment(a, b, view) {
            None => flush(&mut current),
            Some((p, q)) => {
                if current.last() != Some(&p) {
                    flush(&mut current);
                    current.push(p);
                }
                current.push(q);
            }
        }
    }
    flush(&mut current);
    runs
}

/// Break a box-and-whisker glyph into plain lines and markers.
fn box_marks(
    position: f64,
    width: f64,
    stats: &BoxStats,
    orientation: Orientation,
    style: &BoxStyle,
) -> Vec<Mark> {
    // `along` runs with the data values, `across` with the box position.
    let pt = |along: f64, across: f64| match orientation {
        Orientation::Vertical => (across, along),
        Orientation::Horizontal => (along, across),
    };
    let half = width / 2.0;
    let cap = width / 4.0;
    let line = |points: Vec<(f64, f64)>, style: LineStyle| Mark::Line { points, style };

    let mut marks = vec![
        line(
            vec![
                pt(stats.q1, position - half),
                pt(stats.q1, position + half),
                pt(stats.q3, position + half),
                pt(stats.q3, position - half),
                pt(stats.q1, position - half),
            ],
            style.box_line,
        ),
        line(
            vec![pt(stats.q1, position), pt(stats.whisker_low, position)],
            style.whisker,
        ),
        line(
            vec![pt(stats.q3, position), pt(stats.whisker_high, position)],
            style.whisker,
        ),
        line(
            vec![
                pt(stats.whisker_low, position - cap),
                pt(stats.whisker_low, position + cap),
            ],
            style.box_line,
        ),
        line(
            vec![
                pt(stats.whisker_high, position - cap),
                pt(stats.whisker_high, position + cap),
            ],
            style.box_line,
        ),
        line(
            vec![
                pt(stats.median, position - half),
                pt(stats.median, position + half),
            ],
            style.median,
        ),
    ];
    if !stats.outliers.is_empty() {
        marks.push(Mark::Markers {
            points: stats.outliers.iter().map(|&v| pt(v, position)).collect(),
            style: style.flier,
        });
    }
    if let Some(mean) = style.mean {
        marks.push(Mark::Markers {
            points: vec![pt(stats.mean, position)],
            style: mean,
        });
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::{LineStyle, BLACK, FIREBRICK, RED};
    use crate::stats::StatsCalculator;
    use pretty_assertions::assert_eq;

    const UNIT: View = View {
        x: (0.0, 1.0),
        y: (0.0, 1.0),
    };

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(8.0, 8), 1.0);
        assert_eq!(nice_step(360.0, 8), 50.0);
        assert!((nice_step(0.28, 8) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn linear_ticks_cover_range() {
        assert_eq!(
            linear_ticks(0.0, 8.0),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert!((linear_ticks(-0.5, 0.5)[0] + 0.4).abs() < 1e-12);
        assert!(linear_ticks(1.0, 1.0).is_empty());
    }

    #[test]
    fn log_ticks_at_decades() {
        let ticks = log_ticks(0.01, 50.0);
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["0.01", "0.1", "1", "10"]);
        assert_eq!(ticks[0].0, -2.0);
    }

    #[test]
    fn date_ticks_every_five_days() {
        // 2012-04-01 00:00 UTC
        let start = 1_333_238_400.0;
        let ticks = date_ticks(start - 3600.0, start + 12.0 * SECONDS_PER_DAY, 5, "%Y-%m-%d");
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["2012-04-01", "2012-04-06", "2012-04-11"]);
    }

    #[test]
    fn fixed_ticks_follow_the_scale() {
        let marks = vec![
            (0.1, "a".to_string()),
            (10.0, "b".to_string()),
            (1000.0, "c".to_string()),
        ];
        let ticks = fixed_ticks(&marks, Scale::Log, (0.01, 100.0));
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert!((ticks[0].0 + 1.0).abs() < 1e-12);
        assert_eq!(label_at(&ticks, 1.0), "b");
        assert_eq!(label_at(&ticks, 0.5), "");
    }

    #[test]
    fn segments_are_clipped_to_the_view() {
        assert_eq!(
            clip_segment((-1.0, 0.5), (2.0, 0.5), &UNIT),
            Some(((0.0, 0.5), (1.0, 0.5)))
        );
        assert_eq!(clip_segment((2.0, 2.0), (3.0, 3.0), &UNIT), None);
    }

    #[test]
    fn polylines_break_at_gaps() {
        let points = [
            Some((0.1, 0.1)),
            Some((0.2, 0.2)),
            None,
            Some((0.5, 0.5)),
            Some((0.6, 0.6)),
            Some((0.7, 0.7)),
        ];
        let runs = clip_polyline(&points, &UNIT);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].len(), 3);
    }

    #[test]
    fn text_blocks_stack_from_the_anchor() {
        assert_eq!(line_offset(0, 3, 10, VAlign::Bottom), -20);
        assert_eq!(line_offset(2, 3, 10, VAlign::Bottom), 0);
        assert_eq!(line_offset(1, 3, 10, VAlign::Top), 10);
        assert_eq!(line_offset(0, 3, 10, VAlign::Center), -10);
    }

    #[test]
    fn horizontal_box_swaps_axes() {
        let stats = StatsCalculator::box_stats(&[1.0, 2.0, 3.0, 4.0, 5.0, 40.0]).unwrap();
        let style = BoxStyle {
            box_line: LineStyle::solid(BLACK),
            whisker: LineStyle::dashed(BLACK),
            median: LineStyle::solid(FIREBRICK),
            flier: MarkerStyle::new(Marker::Plus, 4, RED),
            mean: None,
        };
        let marks = box_marks(1.0, 0.5, &stats, Orientation::Horizontal, &style);
        // box, two whiskers, two caps, median, fliers
        assert_eq!(marks.len(), 7);
        let Mark::Markers { points, .. } = &marks[6] else {
            panic!("fliers come last");
        };
        assert_eq!(points, &vec![(40.0, 1.0)]);
    }

    #[test]
    fn colour_scale_is_clamped() {
        assert_eq!(normalize(5.0, (0.0, 10.0)), 0.5);
        assert_eq!(normalize(20.0, (0.0, 10.0)), 1.0);
        assert_eq!(normalize(f64::NAN, (0.0, 10.0)), 0.0);
        assert_eq!(normalize(1.0, (1.0, 1.0)), 0.0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let renderer = FigureRenderer::new(FigureConfig::default());
        let err = renderer
            .render(&Figure::new(), "chart.gif")
            .unwrap_err();
        assert!(matches!(err, GraphicsError::UnsupportedFormat(ext) if ext == "gif"));
    }

    #[test]
    fn bare_panel_renders_to_svg() {
        let mut ax = Axes::new();
        ax.plot(vec![(0.0, 0.0), (1.0, 2.0)], LineStyle::dashed(BLACK));
        ax.hide_axes = true;
        let renderer = FigureRenderer::new(FigureConfig::default());
        let svg = renderer.render_svg_string(&Figure::from(ax)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }
}
