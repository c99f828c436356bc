//! Single-column distributions over the filtered table.

use super::stats::{histogram, value_counts};
use super::{
    Bar, BarChart, BarColoring, ChartError, ChartInput, ChartSpec, Figure, Histogram,
    Orientation, PieChart, Slice,
};
use crate::color::{BLUE, GREEN, PURPLE};
use crate::data::model::{COL_CATEGORY, COL_MONTH, COL_PRICE_PER_UNIT, COL_TOTAL_SPENT};

pub const PRICE_BINS: usize = 30;
pub const TOTAL_SPENT_BINS: usize = 20;

pub const BATTERY: &[ChartSpec] = &[
    ChartSpec {
        heading: "Price Per Unit Distribution",
        title: "Price Per Unit Distribution",
        build: price_per_unit_histogram,
    },
    ChartSpec {
        heading: "Most Purchased Product Categories",
        title: "Product Category Distribution",
        build: category_frequency,
    },
    ChartSpec {
        heading: "Distribution of Total Spent",
        title: "Distribution of Total Spent",
        build: total_spent_histogram,
    },
    ChartSpec {
        heading: "Payment Method Distribution",
        title: "Distribution of Payment Methods",
        build: payment_method_share,
    },
    ChartSpec {
        heading: "Transaction Frequency by Month",
        title: "Transaction Frequency by Month",
        build: transactions_by_month,
    },
];

pub fn price_per_unit_histogram(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    Ok(Figure::Histogram(Histogram {
        x_label: COL_PRICE_PER_UNIT,
        bins: histogram(&input.filtered.column(|t| t.price_per_unit), PRICE_BINS),
        color: PURPLE,
    }))
}

/// Bars follow value-count order.
pub fn category_frequency(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let counts = value_counts(input.filtered.rows().iter().map(|t| t.category.as_str()));
    let bars = counts
        .into_iter()
        .enumerate()
        .map(|(i, (label, count))| Bar {
            label,
            position: i as f64,
            value: count as f64,
        })
        .collect();
    Ok(Figure::Bars(BarChart {
        category_label: COL_CATEGORY,
        value_label: "count",
        orientation: Orientation::Vertical,
        categorical_axis: true,
        bars,
        coloring: BarColoring::Uniform(BLUE),
        note: None,
    }))
}

pub fn total_spent_histogram(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    Ok(Figure::Histogram(Histogram {
        x_label: COL_TOTAL_SPENT,
        bins: histogram(&input.filtered.column(|t| t.total_spent), TOTAL_SPENT_BINS),
        color: GREEN,
    }))
}

pub fn payment_method_share(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let total = input.filtered.len();
    let slices = value_counts(
        input
            .filtered
            .rows()
            .iter()
            .map(|t| t.payment_method.as_str()),
    )
    .into_iter()
    .map(|(label, count)| Slice {
        label,
        count,
        share: count as f64 / total as f64,
    })
    .collect();
    Ok(Figure::Pie(PieChart { slices }))
}

/// One bar per month present, placed at the month number.
pub fn transactions_by_month(input: &ChartInput<'_>) -> Result<Figure, ChartError> {
    let mut per_month = [0usize; 12];
    for t in input.filtered.rows() {
        if let Some(slot) = usize::from(t.month)
            .checked_sub(1)
            .and_then(|i| per_month.get_mut(i))
        {
            *slot += 1;
        }
    }
    let bars = per_month
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(i, count)| Bar {
            label: (i + 1).to_string(),
            position: (i + 1) as f64,
            value: *count as f64,
        })
        .collect();
    Ok(Figure::Bars(BarChart {
        category_label: COL_MONTH,
        value_label: "count",
        orientation: Orientation::Vertical,
        categorical_axis: false,
        bars,
        coloring: BarColoring::Uniform(BLUE),
        note: None,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::charts::render_battery;
    use crate::data::filter::{apply_filters, FilterSelection, MonthRange};
    use crate::data::model::fixtures::hundred_rows;
    use crate::data::model::RetailTable;

    fn input<'a>(filtered: &'a RetailTable, raw: &'a RetailTable) -> ChartInput<'a> {
        ChartInput {
            filtered,
            raw,
            filter_top_products: false,
        }
    }

    fn bars(figure: Figure) -> Vec<Bar> {
        match figure {
            Figure::Bars(chart) => chart.bars,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn category_a_in_summer_scenario() {
        let raw = hundred_rows();
        let selection = FilterSelection {
            categories: BTreeSet::from(["A".to_string()]),
            payment_methods: raw.payment_methods().iter().cloned().collect(),
            months: MonthRange::new(6, 8).unwrap(),
        };
        let filtered = apply_filters(&raw, &selection);
        let expected_rows = raw
            .rows()
            .iter()
            .filter(|t| t.category == "A" && (6..=8).contains(&t.month))
            .count();
        assert_eq!(filtered.len(), expected_rows);

        let categories = bars(category_frequency(&input(&filtered, &raw)).unwrap());
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].label, "A");
        assert_eq!(categories[0].value, expected_rows as f64);

        let months = bars(transactions_by_month(&input(&filtered, &raw)).unwrap());
        let positions: Vec<f64> = months.iter().map(|b| b.position).collect();
        assert_eq!(positions, [6.0, 7.0, 8.0]);
        assert_eq!(
            months.iter().map(|b| b.value).sum::<f64>(),
            expected_rows as f64
        );
    }

    #[test]
    fn histograms_use_fixed_bin_counts() {
        let raw = hundred_rows();
        let Figure::Histogram(price) = price_per_unit_histogram(&input(&raw, &raw)).unwrap()
        else {
            panic!("expected histogram");
        };
        assert_eq!(price.bins.len(), PRICE_BINS);
        assert_eq!(price.bins.iter().map(|b| b.count).sum::<usize>(), 100);

        let Figure::Histogram(spent) = total_spent_histogram(&input(&raw, &raw)).unwrap() else {
            panic!("expected histogram");
        };
        assert_eq!(spent.bins.len(), TOTAL_SPENT_BINS);
    }

    #[test]
    fn payment_shares_sum_to_one() {
        let raw = hundred_rows();
        let Figure::Pie(pie) = payment_method_share(&input(&raw, &raw)).unwrap() else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices.len(), 3);
        let total: f64 = pie.slices.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(pie.slices.iter().map(|s| s.count).sum::<usize>(), 100);
    }

    #[test]
    fn section_headings_differ_from_figure_titles_where_named() {
        let category = &BATTERY[1];
        assert_eq!(category.heading, "Most Purchased Product Categories");
        assert_eq!(category.title, "Product Category Distribution");
        assert_eq!(BATTERY[3].heading, "Payment Method Distribution");
        assert_eq!(BATTERY[0].heading, BATTERY[0].title);
    }

    #[test]
    fn empty_table_yields_empty_figures() {
        let raw = hundred_rows();
        let empty = RetailTable::default();
        for chart in render_battery(BATTERY, &input(&empty, &raw)) {
            match chart.outcome.expect("univariate charts accept empty input") {
                Figure::Histogram(h) => assert!(h.bins.is_empty()),
                Figure::Bars(b) => assert!(b.bars.is_empty()),
                Figure::Pie(p) => assert!(p.slices.is_empty()),
                other => panic!("unexpected figure {other:?}"),
            }
        }
    }
}
