//! Wave force regime diagram in the style of Chakrabarti (2005).
//!
//! Each observation (wave height `H`, wave length `λw`, characteristic length
//! `D`) is placed on log-log axes by its diffraction parameter `πD/λw` and its
//! Keulegan-Carpenter number `H/D`, over the fixed region boundaries that
//! separate drag, inertia and diffraction dominated loading.

use crate::charts::figure::{
    palette_color, Annotation, Axes, HAlign, Legend, LegendPosition, LineStyle, Marker,
    MarkerStyle, Scale, Series, VAlign, BLACK,
};
use crate::charts::format::format_general;
use crate::data::is_numeric;
use crate::error::{GraphicsError, Result};
use polars::prelude::{Column, DataType};
use std::f64::consts::PI;
use std::str::FromStr;
use tracing::debug;

/// Deep-water breaking steepness `H/λw`.
pub const BREAKING_STEEPNESS: f64 = 0.14;
/// Upper KC bound of the drag region.
pub const DRAG_KC: f64 = 20.0;
/// Upper KC bound of the inertia-and-drag region.
pub const SMALL_DRAG_KC: f64 = 1.5;
/// Upper KC bound of the large-inertia region.
pub const NEGLIGIBLE_DRAG_KC: f64 = 0.25;
/// Diffraction parameter where diffraction starts to matter.
pub const DIFFRACTION_BOUND: f64 = 0.5;

const FIXED_X_VIEW: (f64, f64) = (0.01, 10.0);
const FIXED_Y_VIEW: (f64, f64) = (0.01, 50.0);
const REGION_FONT: f64 = 10.0;

/// A scalar or a sequence of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Quantity {
    fn cardinality(&self) -> usize {
        match self {
            Quantity::Scalar(_) => 1,
            Quantity::Sequence(v) => v.len(),
        }
    }

    fn into_values(self) -> Vec<f64> {
        match self {
            Quantity::Scalar(v) => vec![v],
            Quantity::Sequence(v) => v,
        }
    }
}

impl From<f64> for Quantity {
    fn from(v: f64) -> Self {
        Quantity::Scalar(v)
    }
}

impl From<i32> for Quantity {
    fn from(v: i32) -> Self {
        Quantity::Scalar(f64::from(v))
    }
}

impl From<Vec<f64>> for Quantity {
    fn from(v: Vec<f64>) -> Self {
        Quantity::Sequence(v)
    }
}

impl From<&[f64]> for Quantity {
    fn from(v: &[f64]) -> Self {
        Quantity::Sequence(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Quantity {
    fn from(v: [f64; N]) -> Self {
        Quantity::Sequence(v.to_vec())
    }
}

impl TryFrom<&Column> for Quantity {
    type Error = GraphicsError;

    /// Numeric columns become sequences; nulls become NaN.
    fn try_from(column: &Column) -> Result<Self> {
        if !is_numeric(column.dtype()) {
            return Err(GraphicsError::InvalidInputKind(format!(
                "column '{}' has type {}, expected a real numeric type",
                column.name(),
                column.dtype()
            )));
        }
        let values = column.cast(&DataType::Float64)?;
        let values = values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Quantity::Sequence(values))
    }
}

impl FromStr for Quantity {
    type Err = GraphicsError;

    /// `"8"` is a scalar, `"8,8,8"` a sequence and `"8,"` a one-element
    /// sequence.
    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| {
            part.trim().parse::<f64>().map_err(|_| {
                GraphicsError::InvalidInputKind(format!("'{}' is not a real number", part.trim()))
            })
        };
        let s = s.trim();
        if s.contains(',') {
            let s = s.strip_suffix(',').unwrap_or(s);
            s.split(',')
                .map(parse)
                .collect::<Result<Vec<_>>>()
                .map(Quantity::Sequence)
        } else {
            parse(s).map(Quantity::Scalar)
        }
    }
}

/// One wave/body pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub height: f64,
    pub wavelength: f64,
    pub diameter: f64,
}

/// Position of an observation on the regime diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimePoint {
    pub diffraction: f64,
    pub kc: f64,
}

impl Observation {
    /// `KC = H/D` and `diffraction = πD/λw`. Zero or negative lengths are
    /// not guarded and give non-finite or negative values.
    pub fn regime_point(&self) -> RegimePoint {
        RegimePoint {
            diffraction: PI * self.diameter / self.wavelength,
            kc: self.height / self.diameter,
        }
    }

    pub fn label(&self) -> String {
        format!(
            "H = {}, λw = {}, D = {}",
            format_general(self.height),
            format_general(self.wavelength),
            format_general(self.diameter)
        )
    }
}

/// Validated observations, normalized to parallel sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Observations {
    Scalar(Observation),
    Series {
        heights: Vec<f64>,
        wavelengths: Vec<f64>,
        diameters: Vec<f64>,
    },
}

impl Observations {
    pub fn new(
        height: impl Into<Quantity>,
        wavelength: impl Into<Quantity>,
        diameter: impl Into<Quantity>,
    ) -> Result<Self> {
        let (h, l, d) = (height.into(), wavelength.into(), diameter.into());

        if let (Quantity::Scalar(height), Quantity::Scalar(wavelength), Quantity::Scalar(diameter)) =
            (&h, &l, &d)
        {
            return Ok(Observations::Scalar(Observation {
                height: *height,
                wavelength: *wavelength,
                diameter: *diameter,
            }));
        }

        if [&h, &l, &d].iter().any(|q| q.cardinality() == 0) {
            return Err(GraphicsError::InvalidInputKind(
                "D, H, and lambda_w must contain at least one value".to_string(),
            ));
        }
        let n = h.cardinality();
        for q in [&l, &d] {
            if q.cardinality() != n {
                return Err(GraphicsError::shape("D, H, and lambda_w", n, q.cardinality()));
            }
        }

        Ok(Observations::Series {
            heights: h.into_values(),
            wavelengths: l.into_values(),
            diameters: d.into_values(),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            Observations::Scalar(_) => 1,
            Observations::Series { heights, .. } => heights.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observations in input order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Observation> + '_> {
        match self {
            Observations::Scalar(o) => Box::new(std::iter::once(*o)),
            Observations::Series {
                heights,
                wavelengths,
                diameters,
            } => Box::new(
                heights
                    .iter()
                    .zip(wavelengths)
                    .zip(diameters)
                    .map(|((&height, &wavelength), &diameter)| Observation {
                        height,
                        wavelength,
                        diameter,
                    }),
            ),
        }
    }

    pub fn regime_points(&self) -> Vec<RegimePoint> {
        self.iter().map(|o| o.regime_point()).collect()
    }

    /// Whether any observation falls outside the region the fixed view was
    /// laid out for.
    pub fn needs_autoscale(&self) -> bool {
        self.iter().any(|o| {
            let p = o.regime_point();
            p.kc >= 10.0 || p.kc <= 0.02 || p.diffraction >= 50.0 || o.wavelength >= 1000.0
        })
    }
}

fn region_label(text: &str, at: (f64, f64), v_align: VAlign) -> Annotation {
    Annotation::new(text, at)
        .size(REGION_FONT)
        .italic()
        .align(HAlign::Center, v_align)
        .clipped()
}

/// Draw the regime diagram for `H`, `λw` and `D` onto `ax`.
///
/// Inputs are validated before `ax` is touched, so on error the axes are left
/// exactly as they were.
pub fn plot_chakrabarti<'a>(
    height: impl Into<Quantity>,
    wavelength: impl Into<Quantity>,
    diameter: impl Into<Quantity>,
    ax: &'a mut Axes,
) -> Result<&'a mut Axes> {
    let observations = Observations::new(height, wavelength, diameter)?;

    ax.set_xscale(Scale::Log).set_yscale(Scale::Log);

    for (i, obs) in observations.iter().enumerate() {
        let p = obs.regime_point();
        ax.add_series(
            Series::markers(
                vec![(p.diffraction, p.kc)],
                MarkerStyle::new(Marker::Circle, 4, palette_color(i)),
            )
            .with_label(obs.label()),
        );
    }

    let autoscale = observations.needs_autoscale();
    if autoscale {
        ax.autoscale(true);
    } else {
        ax.set_xlim(FIXED_X_VIEW.0, FIXED_X_VIEW.1);
        ax.set_ylim(FIXED_Y_VIEW.0, FIXED_Y_VIEW.1);
    }
    debug!(
        observations = observations.len(),
        autoscale, "drawing regime diagram"
    );

    // Deep-water breaking limit, a straight line on log-log axes.
    let x_min = ax.x_view().0.min(FIXED_X_VIEW.0);
    let breaking = |x: f64| BREAKING_STEEPNESS * PI / x;
    ax.plot(
        vec![(10.0, breaking(10.0)), (x_min, breaking(x_min))],
        LineStyle::solid(BLACK),
    );
    ax.annotate(region_label(
        "wave\nbreaking\nH/λw > 0.14",
        (1.0, 7.0),
        VAlign::Center,
    ));

    // Each boundary recomputes its own right edge; earlier lines keep theirs.
    let mut edge = ax.x_view();
    let boundaries = [
        (DRAG_KC, "drag", (0.0125, 30.0), VAlign::Top),
        (SMALL_DRAG_KC, "inertia\n& drag", (0.02, 7.0), VAlign::Center),
        (NEGLIGIBLE_DRAG_KC, "large\ninertia", (8e-2, 0.7), VAlign::Center),
    ];
    for (kc, text, at, v_align) in boundaries {
        edge.1 = BREAKING_STEEPNESS * PI / kc;
        ax.plot(vec![(edge.0, kc), (edge.1, kc)], LineStyle::dashed(BLACK));
        ax.annotate(region_label(text, at, v_align));
    }
    ax.annotate(region_label("all\ninertia", (8e-2, 6e-2), VAlign::Center));

    let mut span = ax.y_view();
    span.1 = BREAKING_STEEPNESS * PI / DIFFRACTION_BOUND;
    ax.plot(
        vec![(DIFFRACTION_BOUND, span.0), (DIFFRACTION_BOUND, span.1)],
        LineStyle::dashed(BLACK),
    );
    ax.annotate(region_label("diffraction", (2.0, 6e-2), VAlign::Center));

    if observations.len() > 1 {
        ax.show_legend(Legend {
            position: LegendPosition::UpperRight,
            font_size: 8.0,
        });
    }

    ax.set_xlabel("Diffraction parameter, πD/λw");
    ax.set_ylabel("KC parameter, H/D");

    Ok(ax)
}
