use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Column names as they appear in the source files
// ---------------------------------------------------------------------------

pub const COL_CATEGORY: &str = "Category";
pub const COL_PAYMENT_METHOD: &str = "Payment Method";
pub const COL_LOCATION: &str = "Location";
pub const COL_ITEM: &str = "Item";
pub const COL_PRICE_PER_UNIT: &str = "Price Per Unit";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_TOTAL_SPENT: &str = "Total Spent";
pub const COL_TRANSACTION_COUNT: &str = "Transaction Count";
pub const COL_CLV: &str = "CLV";
pub const COL_MONTH: &str = "Month";

/// Every column the dashboard reads. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_CATEGORY,
    COL_PAYMENT_METHOD,
    COL_LOCATION,
    COL_ITEM,
    COL_PRICE_PER_UNIT,
    COL_QUANTITY,
    COL_TOTAL_SPENT,
    COL_TRANSACTION_COUNT,
    COL_CLV,
    COL_MONTH,
];

// ---------------------------------------------------------------------------
// Transaction – one row of the dataset
// ---------------------------------------------------------------------------

/// A single retail transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub category: String,
    pub payment_method: String,
    pub location: String,
    pub item: String,
    pub price_per_unit: f64,
    pub quantity: f64,
    pub total_spent: f64,
    pub transaction_count: f64,
    pub clv: f64,
    /// Calendar month, always within 1..=12.
    pub month: u8,
}

// ---------------------------------------------------------------------------
// RetailTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An immutable table of transactions with pre-computed distinct values for
/// the two categorical filter columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetailTable {
    rows: Vec<Transaction>,
    /// Distinct categories in first-appearance order.
    categories: Vec<String>,
    /// Distinct payment methods in first-appearance order.
    payment_methods: Vec<String>,
}

impl RetailTable {
    /// Build the table and its distinct-value indices from loaded rows.
    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        let categories = distinct_in_order(rows.iter().map(|t| t.category.as_str()));
        let payment_methods = distinct_in_order(rows.iter().map(|t| t.payment_method.as_str()));
        RetailTable {
            rows,
            categories,
            payment_methods,
        }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn payment_methods(&self) -> &[String] {
        &self.payment_methods
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project a numeric column into a fresh vector.
    pub fn column(&self, f: impl Fn(&Transaction) -> f64) -> Vec<f64> {
        self.rows.iter().map(f).collect()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::tx;
    use super::*;

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let table = RetailTable::from_rows(vec![
            tx("Food", "Cash", 1),
            tx("Beverages", "Credit Card", 2),
            tx("Food", "Digital Wallet", 3),
            tx("Butchers", "Cash", 4),
        ]);
        assert_eq!(table.categories(), ["Food", "Beverages", "Butchers"]);
        assert_eq!(table.payment_methods(), ["Cash", "Credit Card", "Digital Wallet"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn empty_table_has_no_distinct_values() {
        let table = RetailTable::from_rows(Vec::new());
        assert!(table.is_empty());
        assert!(table.categories().is_empty());
        assert!(table.payment_methods().is_empty());
    }
}
