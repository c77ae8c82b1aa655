//! Buoy summary figures: the three-panel compendium and the monthly
//! significant wave height boxplot.

use crate::charts::figure::{
    Annotation, Axes, BoxStyle, Figure, Grid, GridAxis, HAlign, LineStyle, Mark, Marker,
    MarkerStyle, Orientation, Rgb, SecondaryAxis, Series, Ticks, VAlign, BLACK, BLUE, FIREBRICK,
    GREEN, RED,
};
use crate::charts::format::month_abbrev;
use crate::data::{DataProcessor, WaveSeries};
use crate::error::{GraphicsError, Result};
use crate::stats::StatsCalculator;
use tracing::debug;

pub const COMPENDIUM_SIZE: (u32, u32) = (1500, 1000);
pub const BOXPLOT_SIZE: (u32, u32) = (1000, 1200);

/// Days between date ticks on the compendium time axis.
const COMPENDIUM_TICK_DAYS: u32 = 5;

const BOX_WIDTH: f64 = 0.5;
const SAMPLE_SIZE: usize = 500;
const SAMPLE_MEAN: f64 = 2.3;
const LIGHT_BLUE: Rgb = Rgb(191, 191, 255);

fn dashed_blue_grid() -> Grid {
    Grid {
        axis: GridAxis::Both,
        style: LineStyle::dashed(BLUE),
    }
}

/// Time axis shared by the compendium panels. Only the bottom panel carries
/// tick labels.
fn shared_time_axis(ax: &mut Axes, span: (f64, f64), labelled: bool) {
    ax.set_xlim(span.0, span.1);
    ax.x_ticks = Ticks::Dates {
        interval_days: COMPENDIUM_TICK_DAYS,
        format: if labelled { "%Y-%m-%d" } else { "" }.to_string(),
        rotated: labelled,
    };
}

/// Significant wave height, peak period and peak direction stacked on a
/// shared time axis.
pub fn plot_compendium(
    hs: &WaveSeries,
    tp: &WaveSeries,
    dp: &WaveSeries,
    title: Option<&str>,
) -> Result<Figure> {
    let subtitle = DataProcessor::date_span(hs).ok_or(GraphicsError::EmptySeries("Hs"))?;
    let points = hs.epoch_points();
    let span = points
        .iter()
        .chain(&tp.epoch_points())
        .chain(&dp.epoch_points())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(t, _)| {
            (lo.min(t), hi.max(t))
        });
    debug!(samples = hs.len(), %subtitle, "building compendium");

    let mut p_hs = Axes::new();
    p_hs.plot(points, LineStyle::solid(BLUE));
    p_hs.set_ylim(0.0, 8.0).set_ylabel("Hs [m]");
    p_hs.show_grid(dashed_blue_grid());
    p_hs.secondary_y = Some(SecondaryAxis {
        label: "Hs [ft]".to_string(),
        range: (0.0, 25.0),
    });
    shared_time_axis(&mut p_hs, span, false);

    let mut p_tp = Axes::new();
    p_tp.plot(tp.epoch_points(), LineStyle::solid(BLUE));
    p_tp.set_ylim(0.0, 28.0).set_ylabel("Tp [s]");
    p_tp.show_grid(dashed_blue_grid());
    shared_time_axis(&mut p_tp, span, false);

    let mut p_dp = Axes::new();
    p_dp.scatter(dp.epoch_points(), MarkerStyle::new(Marker::Circle, 2, BLUE));
    p_dp.set_ylim(0.0, 360.0)
        .set_ylabel("Dp [deg]")
        .set_xlabel("Day");
    p_dp.show_grid(dashed_blue_grid());
    shared_time_axis(&mut p_dp, span, true);

    let mut figure = Figure::new().with_size(COMPENDIUM_SIZE.0, COMPENDIUM_SIZE.1);
    figure.title = title.map(str::to_string);
    figure.subtitle = Some(subtitle);
    figure
        .add_panel(p_hs, 1)
        .add_panel(p_tp, 1)
        .add_panel(p_dp, 1);
    Ok(figure)
}

fn box_style(mean: Option<MarkerStyle>) -> BoxStyle {
    BoxStyle {
        box_line: LineStyle::solid(BLACK),
        whisker: LineStyle::dashed(BLACK),
        median: LineStyle::solid(FIREBRICK).width(3),
        flier: MarkerStyle::new(Marker::Plus, 4, RED),
        mean,
    }
}

/// Monthly significant wave height boxes above an explanatory sample box.
pub fn plot_boxplot(hs: &WaveSeries, title: Option<&str>) -> Result<Figure> {
    let groups = DataProcessor::group_by_month(hs);
    if groups.is_empty() {
        return Err(GraphicsError::EmptySeries("Hs"));
    }
    debug!(months = groups.len(), "building monthly boxplot");

    let mut bp = Axes::new();
    let mean_marker = MarkerStyle::new(Marker::HTick, 12, GREEN);
    for group in &groups {
        let Some(stats) = StatsCalculator::box_stats(&group.values) else {
            continue;
        };
        let position = f64::from(group.month);
        bp.add_series(Series {
            mark: Mark::Box {
                position,
                width: BOX_WIDTH,
                stats,
                orientation: Orientation::Vertical,
                style: box_style(Some(mean_marker)),
            },
            label: None,
        });
        bp.annotate(
            Annotation::new(format!("{:.2}", group.mean), (position, group.mean))
                .color(GREEN)
                .align(HAlign::Center, VAlign::Bottom),
        );
    }

    bp.x_ticks = Ticks::Fixed(
        groups
            .iter()
            .map(|g| (f64::from(g.month), month_abbrev(g.month).to_string()))
            .collect(),
    );
    bp.top_ticks = Some(
        groups
            .iter()
            .map(|g| (f64::from(g.month), g.count().to_string()))
            .collect(),
    );
    let first = f64::from(groups[0].month);
    let last = f64::from(groups[groups.len() - 1].month);
    bp.set_xlim(first - 0.5, last + 0.5);
    bp.set_title("Significant Wave Height by Month")
        .set_ylabel("Significant Wave Height, Hs (m)");
    bp.show_grid(Grid {
        axis: GridAxis::X,
        style: LineStyle::solid(LIGHT_BLUE),
    });

    let mut figure = Figure::new().with_size(BOXPLOT_SIZE.0, BOXPLOT_SIZE.1);
    figure.title = title.map(str::to_string);
    figure.add_panel(bp, 4).add_panel(sample_panel()?, 1);
    Ok(figure)
}

/// Horizontal box of normally distributed samples annotated with the parts
/// of a box-and-whisker glyph.
fn sample_panel() -> Result<Axes> {
    let sample = StatsCalculator::normal_sample(2.5, 0.5, SAMPLE_SIZE);
    let stats = StatsCalculator::box_stats(&sample).ok_or(GraphicsError::EmptySeries("sample"))?;
    let (median, q1, q3) = (stats.median, stats.q1, stats.q3);

    let mut ax = Axes::new();
    ax.add_series(Series {
        mark: Mark::Box {
            position: 1.0,
            width: BOX_WIDTH,
            stats,
            orientation: Orientation::Horizontal,
            style: box_style(None),
        },
        label: None,
    });
    ax.scatter(
        vec![(SAMPLE_MEAN, 1.0)],
        MarkerStyle::new(Marker::VTick, 12, GREEN),
    );

    // Anchors measured off the box edges (lower edge at y = 0.75).
    let edge = 1.0 - BOX_WIDTH / 2.0;
    ax.annotate(
        Annotation::new("Median", (median - 0.1, edge * 0.7))
            .size(10.0)
            .color(FIREBRICK),
    );
    ax.annotate(
        Annotation::new("Mean", (SAMPLE_MEAN - 0.1, 0.65))
            .size(10.0)
            .color(GREEN),
    );
    ax.annotate(Annotation::new("25%ile", (q1 * 0.95, edge * 0.85)).size(10.0));
    ax.annotate(Annotation::new("75%ile", (q1 * 1.26, edge * 0.85)).size(10.0));
    ax.annotate(
        Annotation::new("Outliers", (q3 * 1.3, 0.7))
            .size(10.0)
            .color(RED),
    );

    ax.set_ylim(0.5, 1.5);
    ax.set_title("Sample Boxplot");
    ax.hide_axes = true;
    Ok(ax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_timestamp;
    use pretty_assertions::assert_eq;

    fn series(name: &str, samples: &[(&str, f64)]) -> WaveSeries {
        WaveSeries::new(
            name,
            samples.iter().map(|(t, _)| parse_timestamp(t).unwrap()).collect(),
            samples.iter().map(|(_, v)| *v).collect(),
        )
        .unwrap()
    }

    fn april() -> (WaveSeries, WaveSeries, WaveSeries) {
        let times = ["2012-04-01 00:00", "2012-04-15 12:00", "2012-04-30 23:30"];
        let with = |name: &str, values: [f64; 3]| {
            let samples: Vec<(&str, f64)> = times.iter().copied().zip(values).collect();
            series(name, &samples)
        };
        (
            with("Hs", [1.0, 2.5, 1.5]),
            with("Tp", [10.0, 12.0, 8.0]),
            with("Dp", [270.0, 280.0, 300.0]),
        )
    }

    #[test]
    fn compendium_has_three_panels() {
        let (hs, tp, dp) = april();
        let fig = plot_compendium(&hs, &tp, &dp, Some("Grays Harbor, WA - 036p1")).unwrap();

        assert_eq!(fig.panels.len(), 3);
        assert_eq!(fig.title.as_deref(), Some("Grays Harbor, WA - 036p1"));
        assert_eq!(fig.subtitle.as_deref(), Some("2012-04-01 to 2012-04-30"));
        assert_eq!(fig.size, Some(COMPENDIUM_SIZE));

        let p_hs = &fig.panels[0];
        assert_eq!(p_hs.y_view(), (0.0, 8.0));
        assert_eq!(
            p_hs.secondary_y.as_ref().map(|s| s.range),
            Some((0.0, 25.0))
        );
        assert_eq!(fig.panels[1].y_view(), (0.0, 28.0));

        let p_dp = &fig.panels[2];
        assert_eq!(p_dp.y_view(), (0.0, 360.0));
        assert_eq!(p_dp.x_label.as_deref(), Some("Day"));
        assert!(matches!(
            &p_dp.x_ticks,
            Ticks::Dates { interval_days: 5, rotated: true, format } if format == "%Y-%m-%d"
        ));
        assert_eq!(p_hs.x_view(), p_dp.x_view());
    }

    #[test]
    fn compendium_needs_samples() {
        let empty = WaveSeries::new("Hs", vec![], vec![]).unwrap();
        let err = plot_compendium(&empty, &empty, &empty, None).unwrap_err();
        assert!(matches!(err, GraphicsError::EmptySeries("Hs")));
    }

    #[test]
    fn one_box_per_month_with_counts() {
        let hs = series(
            "Hs",
            &[
                ("2011-01-03", 2.0),
                ("2011-01-10", 4.0),
                ("2011-03-01", 1.0),
                ("2011-03-02", 1.5),
                ("2011-03-03", 2.0),
            ],
        );
        let fig = plot_boxplot(&hs, Some("Buoy 46022")).unwrap();
        assert_eq!(fig.height_ratios, vec![4, 1]);
        assert_eq!(fig.size, Some(BOXPLOT_SIZE));

        let bp = &fig.panels[0];
        let positions: Vec<f64> = bp
            .series
            .iter()
            .filter_map(|s| match &s.mark {
                Mark::Box { position, .. } => Some(*position),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![1.0, 3.0]);
        assert_eq!(
            bp.x_ticks,
            Ticks::Fixed(vec![(1.0, "Jan".to_string()), (3.0, "Mar".to_string())])
        );
        assert_eq!(
            bp.top_ticks,
            Some(vec![(1.0, "2".to_string()), (3.0, "3".to_string())])
        );
        let means: Vec<&str> = bp.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(means, vec!["3.00", "1.50"]);
        assert_eq!(bp.annotations[0].color, GREEN);
    }

    #[test]
    fn sample_panel_is_labelled() {
        let hs = series("Hs", &[("2011-06-01", 1.0)]);
        let fig = plot_boxplot(&hs, None).unwrap();
        let sample = &fig.panels[1];
        assert!(sample.hide_axes);
        let texts: Vec<&str> = sample.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["Median", "Mean", "25%ile", "75%ile", "Outliers"]);
        let Mark::Box { stats, orientation, .. } = &sample.series[0].mark else {
            panic!("expected the sample box first");
        };
        assert_eq!(*orientation, Orientation::Horizontal);
        assert_eq!(stats.count, SAMPLE_SIZE);
        assert!((stats.median - 2.5).abs() < 1e-6);
    }

    #[test]
    fn boxplot_rejects_empty_series() {
        let hs = series("Hs", &[("2011-06-01", f64::NAN)]);
        assert!(matches!(
            plot_boxplot(&hs, None),
            Err(GraphicsError::EmptySeries(_))
        ));
    }
}
