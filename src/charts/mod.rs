//! Chart battery: named, stateless table → figure transformations.
//!
//! ```text
//!   filtered RetailTable ─┐
//!                         ├─► ChartSpec::build ─► Result<Figure, ChartError>
//!   raw RetailTable ──────┘         (one per spec, isolated)
//! ```
//!
//! Figures are plain data; drawing them is the UI layer's job.

use eframe::egui::Color32;
use thiserror::Error;

use crate::color::ColorScale;
use crate::data::model::RetailTable;

pub mod multivariate;
pub mod stats;
pub mod univariate;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single chart could not be computed. Siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("needs at least {needed} rows, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("cannot fit a trend line: every {0} value is identical")]
    DegenerateRegression(&'static str),

    #[error("no rows to aggregate")]
    EmptyGroup,
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub x_label: &'static str,
    pub bins: Vec<Bin>,
    pub color: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColoring {
    Uniform(Color32),
    /// One palette colour per bar.
    Categorical,
    /// Colour by bar value along a continuous scale.
    Scale(ColorScale),
}

/// `position` is the bar's coordinate on the category axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub position: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub category_label: &'static str,
    pub value_label: &'static str,
    pub orientation: Orientation,
    /// When false the category axis is numeric and shows plain coordinates.
    pub categorical_axis: bool,
    pub bars: Vec<Bar>,
    pub coloring: BarColoring,
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub slices: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<[f64; 2]>,
    pub trend: Trend,
}

/// Labelled square matrix, e.g. a correlation table.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub labels: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
    pub scale: ColorScale,
    pub annotate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityChart {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// `counts[y][x]`
    pub counts: Vec<Vec<usize>>,
    pub scale: ColorScale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// One entry per group; `None` where the combination has no rows.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarChart {
    pub group_label: &'static str,
    pub value_label: &'static str,
    pub groups: Vec<String>,
    pub series: Vec<Series>,
    pub show_values: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Histogram(Histogram),
    Bars(BarChart),
    Pie(PieChart),
    Line(LineChart),
    Scatter(ScatterChart),
    Heatmap(Heatmap),
    Density(DensityChart),
    GroupedBars(GroupedBarChart),
}

// ---------------------------------------------------------------------------
// Specs and evaluation
// ---------------------------------------------------------------------------

/// What a chart spec may read.
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub filtered: &'a RetailTable,
    pub raw: &'a RetailTable,
    /// Whether the best-seller ranking honours the sidebar filters.
    pub filter_top_products: bool,
}

/// `heading` is the section caption above the figure; `title` names the
/// figure itself. They often coincide.
#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub heading: &'static str,
    pub title: &'static str,
    pub build: fn(&ChartInput<'_>) -> Result<Figure, ChartError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub heading: &'static str,
    pub title: &'static str,
    pub outcome: Result<Figure, ChartError>,
}

/// Evaluate every spec in display order. A failing spec yields an `Err`
/// outcome in its own slot and evaluation continues.
pub fn render_battery(specs: &[ChartSpec], input: &ChartInput<'_>) -> Vec<RenderedChart> {
    specs
        .iter()
        .map(|spec| {
            let outcome = (spec.build)(input);
            match &outcome {
                Ok(_) => log::debug!("chart '{}' built", spec.title),
                Err(e) => log::warn!("chart '{}' unavailable: {e}", spec.title),
            }
            RenderedChart {
                heading: spec.heading,
                title: spec.title,
                outcome,
            }
        })
        .collect()
}
