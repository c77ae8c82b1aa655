//! wave-plot - ocean wave resource charts from the command line
//!
//! Loads CSV data, builds one chart and writes it as SVG or PNG.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wave_graphics::charts::{
    plot_boxplot, plot_chakrabarti, plot_compendium, plot_elevation_timeseries,
    plot_environmental_contour, plot_matrix, plot_spectrum, Axes, ContourOptions, Figure,
    FigureRenderer, MatrixOptions, Quantity,
};
use wave_graphics::data::{BuoyRecords, DataLoader};
use wave_graphics::FigureConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ocean wave resource charts", long_about = None)]
struct Cli {
    /// Figure settings (JSON)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Output image; the extension picks SVG or PNG
    #[arg(short, long, global = true, default_value = "chart.svg", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chakrabarti wave-structure regime diagram
    Chakrabarti {
        /// Wave height(s), comma separated; `8,` is a one-element list
        #[arg(long, allow_hyphen_values = true)]
        height: Quantity,
        /// Wave length(s), comma separated
        #[arg(long, allow_hyphen_values = true)]
        wavelength: Quantity,
        /// Characteristic length(s) of the structure, comma separated
        #[arg(long, allow_hyphen_values = true)]
        diameter: Quantity,
    },
    /// Spectral density against angular frequency
    Spectrum {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Frequency column [Hz]
        #[arg(long, default_value = "frequency")]
        freq_col: String,
    },
    /// Surface elevation time series
    Elevation {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Time column (seconds or timestamps)
        #[arg(long, default_value = "time")]
        time_col: String,
    },
    /// Heatmap of a matrix binned by energy period and wave height
    Matrix {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Column holding the row labels
        #[arg(long)]
        row_col: String,
        #[arg(long, default_value = "Te")]
        x_label: String,
        #[arg(long, default_value = "Hm0")]
        y_label: String,
        /// Colorbar label
        #[arg(long)]
        z_label: Option<String>,
        /// Do not print cell values
        #[arg(long)]
        hide_values: bool,
    },
    /// Observed data overlaid on environmental contours
    Contour {
        /// Observations
        #[arg(value_hint = ValueHint::FilePath)]
        data: PathBuf,
        /// Contour coordinates
        #[arg(value_hint = ValueHint::FilePath)]
        contours: PathBuf,
        #[arg(long, default_value = "Te")]
        x1_col: String,
        #[arg(long, default_value = "Hm0")]
        x2_col: String,
        /// Contour x columns, one per contour
        #[arg(long, value_delimiter = ',', required = true)]
        contour_x: Vec<String>,
        /// Contour y columns, one per contour
        #[arg(long, value_delimiter = ',', required = true)]
        contour_y: Vec<String>,
        /// Contour legend labels
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
        #[arg(long, default_value = "data")]
        data_label: String,
    },
    /// Hs, Tp and Dp panels on a shared time axis
    Compendium {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[command(flatten)]
        columns: BuoyColumns,
        /// Buoy title
        #[arg(long)]
        title: Option<String>,
    },
    /// Monthly boxes of significant wave height
    Boxplot {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[command(flatten)]
        columns: BuoyColumns,
        /// Buoy title
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct BuoyColumns {
    #[arg(long, default_value = "time")]
    time_col: String,
    #[arg(long, default_value = "Hs")]
    hs_col: String,
    #[arg(long, default_value = "Tp")]
    tp_col: String,
    #[arg(long, default_value = "Dp")]
    dp_col: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = match &cli.config {
        Some(path) => FigureConfig::load(path)
            .with_context(|| format!("failed to read figure config {}", path.display()))?,
        None => FigureConfig::default(),
    };

    let figure = build_figure(cli.command)?;
    FigureRenderer::new(config)
        .render(&figure, &cli.output)
        .with_context(|| format!("failed to render {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "done");
    Ok(())
}

fn build_figure(command: Command) -> Result<Figure> {
    let figure = match command {
        Command::Chakrabarti {
            height,
            wavelength,
            diameter,
        } => {
            let mut ax = Axes::new();
            plot_chakrabarti(height, wavelength, diameter, &mut ax)?;
            Figure::from(ax)
        }
        Command::Spectrum { input, freq_col } => {
            let spectrum = load(&input)?.spectrum(&freq_col)?;
            let mut ax = Axes::new();
            plot_spectrum(&spectrum, &mut ax)?;
            Figure::from(ax)
        }
        Command::Elevation { input, time_col } => {
            let eta = load(&input)?.elevation(&time_col)?;
            let mut ax = Axes::new();
            plot_elevation_timeseries(&eta, &mut ax)?;
            Figure::from(ax)
        }
        Command::Matrix {
            input,
            row_col,
            x_label,
            y_label,
            z_label,
            hide_values,
        } => {
            let matrix = load(&input)?.capture_matrix(&row_col)?;
            let options = MatrixOptions {
                x_label,
                y_label,
                z_label,
                show_values: !hide_values,
            };
            let mut ax = Axes::new();
            plot_matrix(&matrix, &options, &mut ax)?;
            Figure::from(ax)
        }
        Command::Contour {
            data,
            contours,
            x1_col,
            x2_col,
            contour_x,
            contour_y,
            labels,
            data_label,
        } => {
            let observed = load(&data)?;
            let x1 = observed.values(&x1_col)?;
            let x2 = observed.values(&x2_col)?;
            let contour_table = load(&contours)?;
            let x1_contour = contour_x
                .iter()
                .map(|c| contour_table.values(c))
                .collect::<wave_graphics::Result<Vec<_>>>()?;
            let x2_contour = contour_y
                .iter()
                .map(|c| contour_table.values(c))
                .collect::<wave_graphics::Result<Vec<_>>>()?;
            let options = ContourOptions {
                x_label: Some(x1_col),
                y_label: Some(x2_col),
                data_label,
                contour_labels: labels,
            };
            let mut ax = Axes::new();
            plot_environmental_contour(&x1, &x2, &x1_contour, &x2_contour, &options, &mut ax)?;
            Figure::from(ax)
        }
        Command::Compendium {
            input,
            columns,
            title,
        } => {
            let records = buoy(&input, &columns)?;
            plot_compendium(&records.hs(), &records.tp(), &records.dp(), title.as_deref())?
        }
        Command::Boxplot {
            input,
            columns,
            title,
        } => {
            let records = buoy(&input, &columns)?;
            plot_boxplot(&records.hs(), title.as_deref())?
        }
    };
    Ok(figure)
}

fn load(path: &Path) -> Result<DataLoader> {
    let mut loader = DataLoader::new();
    loader
        .load_csv(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(loader)
}

fn buoy(path: &Path, columns: &BuoyColumns) -> Result<BuoyRecords> {
    let records = load(path)?.buoy_records(
        &columns.time_col,
        &columns.hs_col,
        &columns.tp_col,
        &columns.dp_col,
    )?;
    Ok(records)
}
