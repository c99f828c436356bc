//! Relationships between columns: correlations, trends, rankings.

use std::collections::BTreeSet;

use super::stats::{correlation_matrix, density, group_mean, group_sum, ols};
use super::{
    Bar, BarChart, BarColoring, ChartError, ChartInput, ChartSpec, DensityChart, Figure,
    GroupedBarChart, Heatmap, LineChart, Orientation, ScatterChart, Series,
};
use crate::color::ColorScale;
use crate::data::model::{
    COL_CATEGORY, COL_CLV, COL_ITEM, COL_LOCATION, COL_MONTH, COL_PRICE_PER_UNIT, COL_QUANTITY,
    COL_TOTAL_SPENT, COL_TRANSACTION_COUNT,
};

/// Items whose name starts with this are placeholders and never ranked.
pub const RESERVED_ITEM_PREFIX: &str = "Item_0";
pub const TOP_PRODUCTS: usize = 15;
pub const DENSITY_BINS: usize = 20;

pub const BATTERY: &[ChartSpec] = &[
    ChartSpec {
        heading: "Correlation Heatmap",
        title: "Correlation Heatmap",
        build: correlation_heatmap,
    },
    ChartSpec {
        heading: "Spending Trends by Month",
        title: "Total Spending by Month",
        build: monthly_spend_trend,
    },
    ChartSpec {
        heading: "Customer CLV vs Transaction Count",
        title: "Customer CLV vs Transaction Count",
        build: clv_vs_transactions,
    },
    ChartSpec {
        heading: "Top 15 Best-Selling Products",
        title: "Top 15 Best-Selling Products",
        build: top_products,
    },
    ChartSpec {
        heading: "Price Per Unit vs Quantity Density",
        title: "Price Per Unit vs Quantity Density",
        build: price_quantity_density,
    },
    ChartSpec {
        heading: "Total Spending by Location",
        title: "Total Spent by Shopping Location",
        build: spend_by_location,
    },
    ChartSpec {
        heading: "Spending by Category & Payment Method",
        title: "Average Spending by Category and Payment Method",
        build: mean_spend_by_category_and_payment,
    },
];

pub fn correlation_heatmap(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let table = input.filtered;
    let values = correlation_matrix(&[
        table.column(|t| t.price_per_unit),
        table.column(|t| t.quantity),
        table.column(|t| t.total_spent),
    ])?;
    Ok(Figure::Heatmap(Heatmap {
        labels: vec![COL_PRICE_PER_UNIT, COL_QUANTITY, COL_TOTAL_SPENT],
        values,
        scale: ColorScale::Sunsetdark,
        annotate: true,
    }))
}

pub fn monthly_spend_trend(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let sums = group_sum(input.filtered.rows().iter().map(|t| (t.month, t.total_spent)));
    Ok(Figure::Line(LineChart {
        x_label: COL_MONTH,
        y_label: COL_TOTAL_SPENT,
        points: sums
            .into_iter()
            .map(|(month, total)| [f64::from(month), total])
            .collect(),
    }))
}

pub fn clv_vs_transactions(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let x = input.filtered.column(|t| t.transaction_count);
    let y = input.filtered.column(|t| t.clv);
    let trend = ols(&x, &y, COL_TRANSACTION_COUNT)?;
    Ok(Figure::Scatter(ScatterChart {
        x_label: COL_TRANSACTION_COUNT,
        y_label: COL_CLV,
        points: x.into_iter().zip(y).map(|(a, b)| [a, b]).collect(),
        trend,
    }))
}

/// Best sellers by summed quantity. Reads the raw table unless the
/// configuration asks for the filtered one.
pub fn top_products(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let source = if input.filter_top_products {
        input.filtered
    } else {
        input.raw
    };
    let ranking = rank_products(
        source
            .rows()
            .iter()
            .map(|t| (t.item.as_str(), t.quantity)),
    );

    let n = ranking.len();
    let bars = ranking
        .into_iter()
        .enumerate()
        .map(|(i, (item, quantity))| Bar {
            label: item,
            // best seller on top
            position: (n - 1 - i) as f64,
            value: quantity,
        })
        .collect();

    Ok(Figure::Bars(BarChart {
        category_label: COL_ITEM,
        value_label: COL_QUANTITY,
        orientation: Orientation::Horizontal,
        categorical_axis: true,
        bars,
        coloring: BarColoring::Scale(ColorScale::Plasma),
        note: (!input.filter_top_products)
            .then_some("Computed over all transactions; sidebar filters are not applied."),
    }))
}

/// Sum quantity per item, drop reserved items, sort descending (ties by item
/// name) and keep the first [`TOP_PRODUCTS`].
pub fn rank_products<'a>(rows: impl Iterator<Item = (&'a str, f64)>) -> Vec<(String, f64)> {
    let sums = group_sum(rows.filter(|(item, _)| !item.starts_with(RESERVED_ITEM_PREFIX)));
    let mut ranking: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(item, qty)| (item.to_string(), qty))
        .collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking.truncate(TOP_PRODUCTS);
    ranking
}

pub fn price_quantity_density(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let (x_edges, y_edges, counts) = density(
        &input.filtered.column(|t| t.price_per_unit),
        &input.filtered.column(|t| t.quantity),
        DENSITY_BINS,
        DENSITY_BINS,
    );
    Ok(Figure::Density(DensityChart {
        x_label: COL_PRICE_PER_UNIT,
        y_label: COL_QUANTITY,
        x_edges,
        y_edges,
        counts,
        scale: ColorScale::Blues,
    }))
}

pub fn spend_by_location(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let sums = group_sum(
        input
            .filtered
            .rows()
            .iter()
            .map(|t| (t.location.as_str(), t.total_spent)),
    );
    let n = sums.len();
    let bars = sums
        .into_iter()
        .enumerate()
        .map(|(i, (location, total))| Bar {
            label: location.to_string(),
            position: (n - 1 - i) as f64,
            value: total,
        })
        .collect();
    Ok(Figure::Bars(BarChart {
        category_label: COL_LOCATION,
        value_label: COL_TOTAL_SPENT,
        orientation: Orientation::Horizontal,
        categorical_axis: true,
        bars,
        coloring: BarColoring::Categorical,
        note: None,
    }))
}

/// Mean Total Spent per (category, payment method); categories on the axis,
/// one series per payment method.
pub fn mean_spend_by_category_and_payment(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    if input.filtered.is_empty() {
        return Err(ChartError::EmptyGroup);
    }
    let means = group_mean(input.filtered.rows().iter().map(|t| {
        (
            (t.category.as_str(), t.payment_method.as_str()),
            t.total_spent,
        )
    }));

    let groups: BTreeSet<&str> = means.keys().map(|(c, _)| *c).collect();
    let methods: BTreeSet<&str> = means.keys().map(|(_, p)| *p).collect();

    let series = methods
        .iter()
        .map(|method| Series {
            name: method.to_string(),
            values: groups
                .iter()
                .map(|group| means.get(&(*group, *method)).copied())
                .collect(),
        })
        .collect();

    Ok(Figure::GroupedBars(GroupedBarChart {
        group_label: COL_CATEGORY,
        value_label: COL_TOTAL_SPENT,
        groups: groups.into_iter().map(str::to_string).collect(),
        series,
        show_values: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::render_battery;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::fixtures::{hundred_rows, tx};
    use crate::data::model::RetailTable;

    fn input<'a>(filtered: &'a RetailTable, raw: &'a RetailTable) -> ChartInput<'a> {
        ChartInput {
            filtered,
            raw,
            filter_top_products: false,
        }
    }

    fn top_bars(figure: Figure) -> Vec<Bar> {
        match figure {
            Figure::Bars(chart) => chart.bars,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn rendered_charts_carry_their_section_headings() {
        let raw = hundred_rows();
        let rendered = render_battery(BATTERY, &input(&raw, &raw));
        assert_eq!(rendered[1].heading, "Spending Trends by Month");
        assert_eq!(rendered[1].title, "Total Spending by Month");
        assert_eq!(rendered[6].heading, "Spending by Category & Payment Method");
    }

    #[test]
    fn correlation_diagonal_is_one() {
        let raw = hundred_rows();
        let Figure::Heatmap(heatmap) = correlation_heatmap(&input(&raw, &raw)).unwrap() else {
            panic!("expected heatmap");
        };
        assert_eq!(heatmap.values.len(), 3);
        for i in 0..3 {
            assert_eq!(heatmap.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(heatmap.values[i][j], heatmap.values[j][i]);
            }
        }
    }

    #[test]
    fn top_products_ignore_filters_and_reserved_items() {
        let raw = hundred_rows();
        let mut selection = FilterSelection::all(&raw);
        selection.categories.clear();
        let filtered = apply_filters(&raw, &selection);
        assert!(filtered.is_empty());

        let bars = top_bars(top_products(&input(&filtered, &raw)).unwrap());
        assert_eq!(bars.len(), TOP_PRODUCTS);
        assert!(bars.iter().all(|b| !b.label.starts_with(RESERVED_ITEM_PREFIX)));
        assert!(bars.windows(2).all(|w| w[0].value >= w[1].value));
        assert_eq!(bars[0].position, (TOP_PRODUCTS - 1) as f64);
    }

    #[test]
    fn top_products_can_follow_filters() {
        let raw = hundred_rows();
        let empty = RetailTable::default();
        let input = ChartInput {
            filtered: &empty,
            raw: &raw,
            filter_top_products: true,
        };
        let Figure::Bars(chart) = top_products(&input).unwrap() else {
            panic!("expected bars");
        };
        assert!(chart.bars.is_empty());
        assert!(chart.note.is_none());
    }

    #[test]
    fn ranking_sums_quantities_and_breaks_ties_by_name() {
        let ranking = rank_products(
            [
                ("Item_2_X", 3.0),
                ("Item_0_X", 100.0),
                ("Item_10_X", 4.0),
                ("Item_1_X", 5.0),
                ("Item_2_X", 2.0),
            ]
            .into_iter(),
        );
        assert_eq!(
            ranking,
            vec![
                ("Item_1_X".to_string(), 5.0),
                ("Item_2_X".to_string(), 5.0),
                ("Item_10_X".to_string(), 4.0),
            ]
        );
    }

    #[test]
    fn monthly_trend_is_ordered_by_month() {
        let rows = vec![tx("A", "Cash", 9), tx("A", "Cash", 2), tx("B", "Cash", 9)];
        let table = RetailTable::from_rows(rows);
        let Figure::Line(line) = monthly_spend_trend(&input(&table, &table)).unwrap() else {
            panic!("expected line");
        };
        assert_eq!(line.points, vec![[2.0, 10.0], [9.0, 20.0]]);
    }

    #[test]
    fn clv_trend_needs_two_points() {
        let table = RetailTable::from_rows(vec![tx("A", "Cash", 1)]);
        assert_eq!(
            clv_vs_transactions(&input(&table, &table)),
            Err(ChartError::InsufficientData { needed: 2, got: 1 })
        );

        let raw = hundred_rows();
        let Figure::Scatter(scatter) = clv_vs_transactions(&input(&raw, &raw)).unwrap() else {
            panic!("expected scatter");
        };
        assert_eq!(scatter.points.len(), 100);
        assert!(scatter.trend.slope > 0.0);
    }

    #[test]
    fn category_payment_means_leave_gaps() {
        let mut cash = tx("Food", "Cash", 1);
        cash.total_spent = 30.0;
        let mut cash2 = tx("Food", "Cash", 2);
        cash2.total_spent = 10.0;
        let card = tx("Tools", "Credit Card", 3);
        let table = RetailTable::from_rows(vec![cash, cash2, card]);

        let Figure::GroupedBars(chart) =
            mean_spend_by_category_and_payment(&input(&table, &table)).unwrap()
        else {
            panic!("expected grouped bars");
        };
        assert_eq!(chart.groups, ["Food", "Tools"]);
        assert_eq!(chart.series[0].name, "Cash");
        assert_eq!(chart.series[0].values, [Some(20.0), None]);
        assert_eq!(chart.series[1].values, [None, Some(10.0)]);
    }

    #[test]
    fn location_totals() {
        let raw = hundred_rows();
        let Figure::Bars(chart) = spend_by_location(&input(&raw, &raw)).unwrap() else {
            panic!("expected bars");
        };
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["In-store", "Online"]);
        let total: f64 = raw.rows().iter().map(|t| t.total_spent).sum();
        let charted: f64 = chart.bars.iter().map(|b| b.value).sum();
        assert!((total - charted).abs() < 1e-9);
    }

    #[test]
    fn empty_filtered_table_never_panics() {
        let raw = hundred_rows();
        let empty = RetailTable::default();
        let rendered = render_battery(BATTERY, &input(&empty, &raw));
        assert_eq!(rendered.len(), BATTERY.len());
        assert!(matches!(
            rendered[0].outcome,
            Err(ChartError::InsufficientData { .. })
        ));
        assert!(rendered[3].outcome.is_ok());
        assert_eq!(rendered[6].outcome, Err(ChartError::EmptyGroup));
    }
}
