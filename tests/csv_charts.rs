use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use wave_graphics::charts::figure::{Mark, Ticks};
use wave_graphics::charts::{
    plot_boxplot, plot_compendium, plot_matrix, plot_spectrum, Axes, MatrixOptions,
};
use wave_graphics::data::DataLoader;
use wave_graphics::GraphicsError;

fn csv(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn load(file: &NamedTempFile) -> DataLoader {
    let mut loader = DataLoader::new();
    loader.load_csv(file.path()).unwrap();
    loader
}

const BUOY: &str = "\
time,Hs,Tp,Dp
2011-01-03 00:00:00,2.0,12.0,280
2011-01-10 00:00:00,4.0,14.0,290
2011-02-01 00:00:00,3.0,11.0,270
2011-02-02 00:00:00,,10.0,265
,1.0,9.0,260
2011-03-15 12:00:00,1.5,8.0,250
";

#[test]
fn buoy_csv_to_compendium() {
    let file = csv(BUOY);
    let records = load(&file).buoy_records("time", "Hs", "Tp", "Dp").unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.hs[3].is_nan());

    let fig = plot_compendium(&records.hs(), &records.tp(), &records.dp(), Some("Buoy 46022")).unwrap();
    assert_eq!(fig.panels.len(), 3);
    assert_eq!(fig.subtitle.as_deref(), Some("2011-01-03 to 2011-03-15"));
}

#[test]
fn buoy_csv_to_monthly_boxplot() {
    let file = csv(BUOY);
    let records = load(&file).buoy_records("time", "Hs", "Tp", "Dp").unwrap();
    let fig = plot_boxplot(&records.hs(), None).unwrap();

    let bp = &fig.panels[0];
    assert_eq!(
        bp.x_ticks,
        Ticks::Fixed(vec![
            (1.0, "Jan".to_string()),
            (2.0, "Feb".to_string()),
            (3.0, "Mar".to_string()),
        ])
    );
    // The NaN sample in February is not counted.
    assert_eq!(
        bp.top_ticks,
        Some(vec![
            (1.0, "2".to_string()),
            (2.0, "1".to_string()),
            (3.0, "1".to_string()),
        ])
    );
}

#[test]
fn capture_matrix_csv() {
    let file = csv("Hm0,6.5,7.5,8.5\n0.5,1.0,2.0,\n1.5,3.0,4.0,5.0\n");
    let matrix = load(&file).capture_matrix("Hm0").unwrap();
    assert_eq!(matrix.x_labels, vec![6.5, 7.5, 8.5]);
    assert_eq!(matrix.y_labels, vec![0.5, 1.5]);

    let mut ax = Axes::new();
    plot_matrix(&matrix, &MatrixOptions::default(), &mut ax).unwrap();
    let Mark::Cells { cells, .. } = &ax.series[0].mark else {
        panic!("expected heatmap cells");
    };
    assert_eq!(cells.len(), 5);
    assert_eq!(ax.annotations.len(), 5);
    assert_eq!(ax.y_label.as_deref(), Some("Hm0"));
}

#[test]
fn spectrum_csv() {
    let file = csv("frequency,S\n0.1,1.0\n0.2,2.0\n0.3,0.5\n");
    let spectrum = load(&file).spectrum("frequency").unwrap();
    let mut ax = Axes::new();
    plot_spectrum(&spectrum, &mut ax).unwrap();
    assert_eq!(ax.series.len(), 1);
    assert_eq!(ax.series[0].points().len(), 3);
}

#[test]
fn missing_column_is_reported() {
    let file = csv("frequency,S\n0.1,1.0\n");
    let err = load(&file).spectrum("freq").unwrap_err();
    assert!(matches!(err, GraphicsError::MissingColumn(name) if name == "freq"));
}
