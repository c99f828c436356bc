use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar as PlotBar, BarChart as PlotBarChart, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::charts::{
    BarChart, BarColoring, DensityChart, Figure, GroupedBarChart, Heatmap, Histogram, LineChart,
    Orientation, PieChart, RenderedChart, ScatterChart,
};
use crate::color::{contrast_text, generate_palette, CategoryColors, ColorScale};

const PLOT_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Chart card (central panel)
// ---------------------------------------------------------------------------

/// Render one chart of the battery: its section heading, the figure title and
/// the figure, or an inline placeholder when the chart could not be computed.
pub fn chart_card(ui: &mut Ui, chart: &RenderedChart, colors: &CategoryColors) {
    ui.heading(chart.heading);
    ui.label(RichText::new(chart.title).strong());
    match &chart.outcome {
        Ok(figure) => figure_plot(ui, chart.title, figure, colors),
        Err(e) => placeholder(ui, &format!("Chart unavailable: {e}")),
    }
    ui.add_space(12.0);
    ui.separator();
}

fn placeholder(ui: &mut Ui, message: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_height(60.0);
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(message).italics().color(Color32::from_rgb(200, 120, 0)));
        });
    });
}

fn figure_plot(ui: &mut Ui, id: &str, figure: &Figure, colors: &CategoryColors) {
    match figure {
        Figure::Histogram(h) => histogram(ui, id, h),
        Figure::Bars(b) => bars(ui, id, b, colors),
        Figure::Pie(p) => pie(ui, id, p, colors),
        Figure::Line(l) => line(ui, id, l),
        Figure::Scatter(s) => scatter(ui, id, s),
        Figure::Heatmap(h) => heatmap(ui, id, h),
        Figure::Density(d) => density(ui, id, d),
        Figure::GroupedBars(g) => grouped_bars(ui, id, g, colors),
    }
}

fn base_plot(id: &str) -> Plot {
    Plot::new(id.to_owned())
        .height(PLOT_HEIGHT)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .allow_boxed_zoom(true)
}

/// Axis labels for integer coordinates; other grid marks stay blank.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn no_data(ui: &mut Ui) {
    placeholder(ui, "No rows match the current filters.");
}

// ---------------------------------------------------------------------------
// Per-figure renderers
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, id: &str, h: &Histogram) {
    if h.bins.is_empty() {
        return no_data(ui);
    }
    let bars: Vec<PlotBar> = h
        .bins
        .iter()
        .map(|b| {
            PlotBar::new((b.lo + b.hi) / 2.0, b.count as f64)
                .width(b.hi - b.lo)
                .name(format!("{:.2} – {:.2}", b.lo, b.hi))
                .fill(h.color)
        })
        .collect();
    base_plot(id)
        .x_axis_label(h.x_label)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(PlotBarChart::new(bars).color(h.color));
        });
}

fn bars(ui: &mut Ui, id: &str, chart: &BarChart, colors: &CategoryColors) {
    if let Some(note) = chart.note {
        ui.small(note);
    }
    if chart.bars.is_empty() {
        return no_data(ui);
    }

    let (min, max) = chart
        .bars
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.value), hi.max(b.value))
        });

    let plot_bars: Vec<PlotBar> = chart
        .bars
        .iter()
        .map(|b| {
            let fill = match chart.coloring {
                BarColoring::Uniform(c) => c,
                BarColoring::Categorical => colors.color_for(&b.label),
                BarColoring::Scale(scale) => scale.sample_range(b.value, min, max),
            };
            PlotBar::new(b.position, b.value)
                .width(0.7)
                .name(&b.label)
                .fill(fill)
        })
        .collect();

    let mut labels = vec![String::new(); chart.bars.len()];
    for b in &chart.bars {
        if let Some(slot) = labels.get_mut(b.position as usize) {
            slot.clone_from(&b.label);
        }
    }

    let mut plot = base_plot(id);
    let mut bar_chart = PlotBarChart::new(plot_bars);
    match chart.orientation {
        Orientation::Vertical => {
            plot = plot
                .x_axis_label(chart.category_label)
                .y_axis_label(chart.value_label);
            if chart.categorical_axis {
                plot = plot.x_axis_formatter(category_formatter(labels));
            }
        }
        Orientation::Horizontal => {
            bar_chart = bar_chart.horizontal();
            plot = plot
                .x_axis_label(chart.value_label)
                .y_axis_label(chart.category_label);
            if chart.categorical_axis {
                plot = plot.y_axis_formatter(category_formatter(labels));
            }
        }
    }
    plot.show(ui, |plot_ui| plot_ui.bar_chart(bar_chart));
}

fn pie(ui: &mut Ui, id: &str, chart: &PieChart, colors: &CategoryColors) {
    if chart.slices.is_empty() {
        return no_data(ui);
    }

    base_plot(id)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0_f64;
            for slice in &chart.slices {
                let sweep = slice.share * TAU;
                let fill = colors.color_for(&slice.label);
                let label = format!("{} ({})", slice.label, slice.count);
                // wedges wider than a quarter turn are split to stay convex
                let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
                for k in 0..pieces {
                    let a0 = start + sweep * k as f64 / pieces as f64;
                    let a1 = start + sweep * (k + 1) as f64 / pieces as f64;
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge(a0, a1)))
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&label),
                    );
                }

                let mid = start + sweep / 2.0;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                        RichText::new(format!("{:.1}%", slice.share * 100.0))
                            .color(contrast_text(fill))
                            .strong(),
                    )
                    .anchor(Align2::CENTER_CENTER),
                );
                start += sweep;
            }
        });
}

/// Unit-circle sector from `a0` to `a1` (radians), centre included.
fn wedge(a0: f64, a1: f64) -> Vec<[f64; 2]> {
    const STEPS: usize = 24;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=STEPS).map(|i| {
        let a = a0 + (a1 - a0) * i as f64 / STEPS as f64;
        [a.cos(), a.sin()]
    }));
    points
}

fn line(ui: &mut Ui, id: &str, chart: &LineChart) {
    if chart.points.is_empty() {
        return no_data(ui);
    }
    base_plot(id)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(chart.points.clone()))
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0)
                    .name(chart.y_label),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(chart.points.clone()))
                    .radius(3.0)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

fn scatter(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    let (x_min, x_max) = chart
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[0]), hi.max(p[0]))
        });
    let trend = chart.trend;

    base_plot(id)
        .legend(Legend::default())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(chart.points.clone()))
                    .radius(2.5)
                    .color(Color32::from_rgb(99, 110, 250))
                    .name(chart.y_label),
            );
            plot_ui.line(
                Line::new(PlotPoints::from(vec![
                    [x_min, trend.at(x_min)],
                    [x_max, trend.at(x_max)],
                ]))
                .color(Color32::from_rgb(239, 85, 59))
                .width(2.0)
                .name(format!(
                    "OLS trend: y = {:.2} + {:.2}x (R² = {:.3})",
                    trend.intercept, trend.slope, trend.r_squared
                )),
            );
        });
}

fn heatmap(ui: &mut Ui, id: &str, chart: &Heatmap) {
    let n = chart.labels.len();
    let labels: Vec<String> = chart.labels.iter().map(|l| l.to_string()).collect();
    let mut reversed = labels.clone();
    reversed.reverse();

    base_plot(id)
        .data_aspect(1.0)
        .show_grid(false)
        .x_axis_formatter(category_formatter(labels))
        .y_axis_formatter(category_formatter(reversed))
        .show(ui, |plot_ui| {
            for (i, row) in chart.values.iter().enumerate() {
                for (j, value) in row.iter().enumerate() {
                    // correlations live in [-1, 1]
                    let fill = chart.scale.sample((value + 1.0) / 2.0);
                    let (x, y) = (j as f64, (n - 1 - i) as f64);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell(x - 0.5, x + 0.5, y - 0.5, y + 0.5)))
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    if chart.annotate {
                        let text = if value.is_nan() {
                            "n/a".to_string()
                        } else {
                            format!("{value:.3}")
                        };
                        plot_ui.text(
                            Text::new(PlotPoint::new(x, y), RichText::new(text).color(contrast_text(fill)))
                                .anchor(Align2::CENTER_CENTER),
                        );
                    }
                }
            }
        });
    color_legend(ui, chart.scale, "-1", "1");
}

fn density(ui: &mut Ui, id: &str, chart: &DensityChart) {
    if chart.counts.is_empty() {
        return no_data(ui);
    }
    let max = chart.counts.iter().flatten().copied().max().unwrap_or(0) as f64;

    base_plot(id)
        .show_grid(false)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .show(ui, |plot_ui| {
            for (yi, row) in chart.counts.iter().enumerate() {
                for (xi, count) in row.iter().enumerate() {
                    let fill = chart.scale.sample_range(*count as f64, 0.0, max);
                    let points = cell(
                        chart.x_edges[xi],
                        chart.x_edges[xi + 1],
                        chart.y_edges[yi],
                        chart.y_edges[yi + 1],
                    );
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(points))
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, fill)),
                    );
                }
            }
        });
    color_legend(ui, chart.scale, "0", &format!("{max} rows"));
}

fn cell(x0: f64, x1: f64, y0: f64, y1: f64) -> Vec<[f64; 2]> {
    vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
}

fn color_legend(ui: &mut Ui, scale: ColorScale, low: &str, high: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.small(low);
        for step in 0..=10 {
            let swatch = scale.sample(step as f64 / 10.0);
            ui.label(RichText::new("■").color(swatch));
        }
        ui.small(high);
    });
}

fn grouped_bars(ui: &mut Ui, id: &str, chart: &GroupedBarChart, colors: &CategoryColors) {
    if chart.groups.is_empty() {
        return no_data(ui);
    }
    let k = chart.series.len().max(1);
    let width = 0.8 / k as f64;
    let fallback = generate_palette(k);

    base_plot(id)
        .legend(Legend::default())
        .x_axis_label(chart.group_label)
        .y_axis_label(chart.value_label)
        .x_axis_formatter(category_formatter(chart.groups.clone()))
        .show(ui, |plot_ui| {
            for (s, series) in chart.series.iter().enumerate() {
                let mut fill = colors.color_for(&series.name);
                if fill == Color32::GRAY {
                    fill = fallback[s];
                }
                let offset = (s as f64 - (k as f64 - 1.0) / 2.0) * width;
                let mut bars = Vec::new();
                for (g, value) in series.values.iter().enumerate() {
                    let Some(value) = value else { continue };
                    let x = g as f64 + offset;
                    bars.push(
                        PlotBar::new(x, *value)
                            .width(width * 0.95)
                            .name(format!("{} / {}", chart.groups[g], series.name))
                            .fill(fill),
                    );
                    if chart.show_values {
                        plot_ui.text(
                            Text::new(PlotPoint::new(x, *value), RichText::new(format!("{value:.2}")).small())
                                .anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                }
                plot_ui.bar_chart(PlotBarChart::new(bars).color(fill).name(&series.name));
            }
        });
}
