use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{RetailTable, Transaction};

pub const FIRST_MONTH: u8 = 1;
pub const LAST_MONTH: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("month range {lo}..={hi} must satisfy 1 <= lo <= hi <= 12")]
    InvalidMonthRange { lo: u8, hi: u8 },
}

// ---------------------------------------------------------------------------
// Month range
// ---------------------------------------------------------------------------

/// Inclusive month interval, always within the calendar and never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    lo: u8,
    hi: u8,
}

impl MonthRange {
    pub fn new(lo: u8, hi: u8) -> Result<Self, FilterError> {
        if FIRST_MONTH <= lo && lo <= hi && hi <= LAST_MONTH {
            Ok(Self { lo, hi })
        } else {
            Err(FilterError::InvalidMonthRange { lo, hi })
        }
    }

    /// January through December.
    pub const fn full_year() -> Self {
        Self {
            lo: FIRST_MONTH,
            hi: LAST_MONTH,
        }
    }

    pub fn lo(&self) -> u8 {
        self.lo
    }

    pub fn hi(&self) -> u8 {
        self.hi
    }

    pub fn contains(&self, month: u8) -> bool {
        (self.lo..=self.hi).contains(&month)
    }
}

impl Default for MonthRange {
    fn default() -> Self {
        Self::full_year()
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// The three sidebar predicates. A row passes when all of them hold; an empty
/// set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub payment_methods: BTreeSet<String>,
    pub months: MonthRange,
}

impl FilterSelection {
    /// Identity selection: every category, every payment method, whole year.
    pub fn all(table: &RetailTable) -> Self {
        Self {
            categories: table.categories().iter().cloned().collect(),
            payment_methods: table.payment_methods().iter().cloned().collect(),
            months: MonthRange::full_year(),
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.categories.contains(&tx.category)
            && self.payment_methods.contains(&tx.payment_method)
            && self.months.contains(tx.month)
    }
}

/// Return indices of transactions that pass the selection.
pub fn filtered_indices(table: &RetailTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

/// Build the filtered table. The input is never modified.
pub fn apply_filters(table: &RetailTable, selection: &FilterSelection) -> RetailTable {
    let rows = filtered_indices(table, selection)
        .into_iter()
        .map(|i| table.rows()[i].clone())
        .collect();
    RetailTable::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::hundred_rows;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn identity_selection_keeps_every_row() {
        let table = hundred_rows();
        let filtered = apply_filters(&table, &FilterSelection::all(&table));
        assert_eq!(filtered.len(), table.len());
        assert_eq!(filtered, table);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = hundred_rows();
        let selection = FilterSelection {
            categories: set(&["B"]),
            payment_methods: set(&["Cash", "Digital Wallet"]),
            months: MonthRange::new(2, 9).unwrap(),
        };
        let once = apply_filters(&table, &selection);
        let twice = apply_filters(&once, &selection);
        assert_eq!(once, twice);
        assert!(!once.is_empty());
    }

    #[test]
    fn empty_category_set_yields_empty_table() {
        let table = hundred_rows();
        let mut selection = FilterSelection::all(&table);
        selection.categories.clear();
        assert!(apply_filters(&table, &selection).is_empty());
    }

    #[test]
    fn month_range_is_inclusive() {
        let table = hundred_rows();
        let mut selection = FilterSelection::all(&table);
        selection.months = MonthRange::new(3, 3).unwrap();
        let filtered = apply_filters(&table, &selection);
        assert!(!filtered.is_empty());
        assert!(filtered.rows().iter().all(|t| t.month == 3));
        let expected = table.rows().iter().filter(|t| t.month == 3).count();
        assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let table = hundred_rows();
        let selection = FilterSelection {
            categories: set(&["A"]),
            payment_methods: set(&["Cash", "Credit Card", "Digital Wallet"]),
            months: MonthRange::new(6, 8).unwrap(),
        };
        let filtered = apply_filters(&table, &selection);
        let expected: Vec<_> = table
            .rows()
            .iter()
            .filter(|t| t.category == "A" && (6..=8).contains(&t.month))
            .cloned()
            .collect();
        assert_eq!(filtered.rows(), expected.as_slice());
        assert_eq!(filtered.categories(), ["A"]);
    }

    #[test]
    fn source_table_is_untouched() {
        let table = hundred_rows();
        let before = table.clone();
        let mut selection = FilterSelection::all(&table);
        selection.payment_methods = set(&["Cash"]);
        let _ = apply_filters(&table, &selection);
        assert_eq!(table, before);
    }

    #[test]
    fn month_range_rejects_inverted_and_out_of_calendar() {
        assert!(MonthRange::new(5, 4).is_err());
        assert!(MonthRange::new(0, 4).is_err());
        assert_eq!(
            MonthRange::new(1, 13),
            Err(FilterError::InvalidMonthRange { lo: 1, hi: 13 })
        );
        assert_eq!(MonthRange::default(), MonthRange::full_year());
    }
}
