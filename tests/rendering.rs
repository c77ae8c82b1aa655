use chrono::NaiveDateTime;
use std::fs;
use tempfile::tempdir;
use wave_graphics::charts::{
    plot_boxplot, plot_chakrabarti, plot_compendium, plot_matrix, Axes, Figure, FigureRenderer,
    MatrixOptions,
};
use wave_graphics::data::{CaptureMatrix, WaveSeries};
use wave_graphics::FigureConfig;

fn renderer() -> FigureRenderer {
    FigureRenderer::new(FigureConfig::default())
}

/// Whether the SVG document holds a text element reading exactly `text`.
fn has_text(svg: &str, text: &str) -> bool {
    svg.contains(&format!(">\n{text}\n</text>"))
}

fn time(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
}

fn series(name: &str, samples: &[(&str, f64)]) -> WaveSeries {
    WaveSeries::new(
        name,
        samples.iter().map(|(t, _)| time(t)).collect(),
        samples.iter().map(|(_, v)| *v).collect(),
    )
    .unwrap()
}

fn regime_figure() -> Figure {
    let mut ax = Axes::new();
    plot_chakrabarti(vec![8.0, 6.0], vec![150.0, 120.0], vec![5.0, 5.0], &mut ax).unwrap();
    Figure::from(ax)
}

#[test]
fn regime_diagram_draws_regions_and_legend() {
    let svg = renderer().render_svg_string(&regime_figure()).unwrap();

    assert!(has_text(&svg, "diffraction"));
    assert!(has_text(&svg, "drag"));
    assert!(has_text(&svg, "breaking"));
    assert!(has_text(&svg, "H = 8, λw = 150, D = 5"));
    assert!(has_text(&svg, "H = 6, λw = 120, D = 5"));
    // decade labels on the log axes
    assert!(has_text(&svg, "0.1"));
    assert!(has_text(&svg, "1"));
}

#[test]
fn single_observation_has_no_legend() {
    let mut ax = Axes::new();
    plot_chakrabarti(8.0, 150.0, 5.0, &mut ax).unwrap();
    let svg = renderer().render_svg_string(&Figure::from(ax)).unwrap();

    assert!(has_text(&svg, "diffraction"));
    assert!(!has_text(&svg, "H = 8, λw = 150, D = 5"));
}

#[test]
fn matrix_draws_values_and_colorbar() {
    let matrix = CaptureMatrix::new(
        vec![6.5, 7.5],
        vec![0.5, 1.5],
        vec![vec![1.0, f64::NAN], vec![3.0, 4.0]],
    )
    .unwrap();
    let options = MatrixOptions {
        z_label: Some("Capture length [m]".to_string()),
        ..MatrixOptions::default()
    };
    let mut ax = Axes::new();
    plot_matrix(&matrix, &options, &mut ax).unwrap();
    let svg = renderer().render_svg_string(&Figure::from(ax)).unwrap();

    assert!(has_text(&svg, "4.00"));
    assert!(!has_text(&svg, "NaN"));
    assert!(has_text(&svg, "Capture length [m]"));
    assert!(has_text(&svg, "6.5"));
    assert!(has_text(&svg, "Hm0"));
}

#[test]
fn compendium_draws_secondary_axis_and_rotated_dates() {
    let times = ["2012-04-01 00:00", "2012-04-15 12:00", "2012-04-30 23:30"];
    let with = |name: &str, values: [f64; 3]| {
        let samples: Vec<(&str, f64)> = times.iter().copied().zip(values).collect();
        series(name, &samples)
    };
    let figure = plot_compendium(
        &with("Hs", [1.0, 2.5, 1.5]),
        &with("Tp", [10.0, 12.0, 8.0]),
        &with("Dp", [270.0, 280.0, 300.0]),
        Some("Buoy 46022"),
    )
    .unwrap();
    let svg = renderer().render_svg_string(&figure).unwrap();

    assert!(has_text(&svg, "Buoy 46022"));
    assert!(has_text(&svg, "2012-04-01 to 2012-04-30"));
    assert!(has_text(&svg, "Hs [ft]"));
    assert!(has_text(&svg, "25"));
    assert!(has_text(&svg, "2012-04-06"));
    assert!(svg.contains("rotate(90,"));
    assert!(has_text(&svg, "Dp [deg]"));
}

#[test]
fn boxplot_draws_months_counts_and_sample_panel() {
    let mut samples: Vec<(String, f64)> = (1..=11)
        .map(|day| (format!("2011-01-{day:02} 00:00"), 1.0 + f64::from(day) / 10.0))
        .collect();
    samples.extend((1..=7).map(|day| (format!("2011-02-{day:02} 00:00"), 1.5 + f64::from(day) / 10.0)));
    let borrowed: Vec<(&str, f64)> = samples.iter().map(|(t, v)| (t.as_str(), *v)).collect();

    let figure = plot_boxplot(&series("Hs", &borrowed), None).unwrap();
    let svg = renderer().render_svg_string(&figure).unwrap();

    assert!(has_text(&svg, "Jan"));
    assert!(has_text(&svg, "Feb"));
    assert!(has_text(&svg, "11"));
    assert!(has_text(&svg, "7"));
    assert!(has_text(&svg, "Significant Wave Height by Month"));
    assert!(has_text(&svg, "Sample Boxplot"));
    assert!(has_text(&svg, "Median"));
}

#[test]
fn extension_picks_the_output_format() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("regime.png");
    let svg = dir.path().join("regime.svg");

    renderer().render(&regime_figure(), &png).unwrap();
    renderer().render(&regime_figure(), &svg).unwrap();

    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
    let text = fs::read_to_string(&svg).unwrap();
    assert!(text.starts_with("<svg"));
    assert!(has_text(&text, "diffraction"));
}
