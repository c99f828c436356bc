use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 12_000;
const CUSTOMERS: usize = 25;

const CATEGORIES: [(&str, &str); 8] = [
    ("Beverages", "BEV"),
    ("Butchers", "BUT"),
    ("Computers and electric accessories", "CEA"),
    ("Electric household essentials", "EHE"),
    ("Food", "FOOD"),
    ("Furniture", "FUR"),
    ("Milk Products", "MILK"),
    ("Patisserie", "PAT"),
];
const PAYMENT_METHODS: [&str; 3] = ["Cash", "Credit Card", "Digital Wallet"];
const LOCATIONS: [&str; 2] = ["In-store", "Online"];
const ITEMS_PER_CATEGORY: usize = 25;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Month with extra weight on January and July.
    fn month(&mut self) -> i64 {
        if self.next_f64() < 0.2 {
            if self.next_f64() < 0.5 { 1 } else { 7 }
        } else {
            self.below(12) as i64 + 1
        }
    }
}

#[derive(Default)]
struct Columns {
    customer: Vec<String>,
    category: Vec<String>,
    item: Vec<String>,
    price: Vec<f64>,
    quantity: Vec<i64>,
    total: Vec<f64>,
    payment: Vec<String>,
    location: Vec<String>,
    month: Vec<i64>,
    transaction_count: Vec<i64>,
    clv: Vec<f64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    let mut per_customer_count = vec![0i64; CUSTOMERS];
    let mut per_customer_spend = vec![0.0f64; CUSTOMERS];
    let mut customer_of_row = Vec::with_capacity(ROWS);

    for _ in 0..ROWS {
        let customer = rng.below(CUSTOMERS);
        let (category, code) = CATEGORIES[rng.below(CATEGORIES.len())];
        let item_no = rng.below(ITEMS_PER_CATEGORY);
        // cheaper items are far more common
        let price = (5.0 + 36.0 * rng.next_f64().powi(2)).round() + 0.5;
        let quantity = 1 + rng.below(10) as i64;
        let total = price * quantity as f64;

        per_customer_count[customer] += 1;
        per_customer_spend[customer] += total;
        customer_of_row.push(customer);

        cols.customer.push(format!("CUST_{:02}", customer + 1));
        cols.category.push(category.to_string());
        cols.item.push(format!("Item_{item_no}_{code}"));
        cols.price.push(price);
        cols.quantity.push(quantity);
        cols.total.push(total);
        cols.payment.push(PAYMENT_METHODS[rng.below(PAYMENT_METHODS.len())].to_string());
        let online = rng.next_f64() < 0.5;
        cols.location.push(LOCATIONS[usize::from(online)].to_string());
        cols.month.push(rng.month());
    }

    for customer in customer_of_row {
        cols.transaction_count.push(per_customer_count[customer]);
        cols.clv.push((per_customer_spend[customer] * 100.0).round() / 100.0);
    }
    cols
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "Customer ID",
        "Category",
        "Item",
        "Price Per Unit",
        "Quantity",
        "Total Spent",
        "Payment Method",
        "Location",
        "Month",
        "Transaction Count",
        "CLV",
    ])?;
    for i in 0..cols.customer.len() {
        writer.write_record([
            cols.customer[i].clone(),
            cols.category[i].clone(),
            cols.item[i].clone(),
            cols.price[i].to_string(),
            cols.quantity[i].to_string(),
            cols.total[i].to_string(),
            cols.payment[i].clone(),
            cols.location[i].clone(),
            cols.month[i].to_string(),
            cols.transaction_count[i].to_string(),
            cols.clv[i].to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let strings = |v: &[String]| StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Customer ID", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Item", DataType::Utf8, false),
        Field::new("Price Per Unit", DataType::Float64, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Total Spent", DataType::Float64, false),
        Field::new("Payment Method", DataType::Utf8, false),
        Field::new("Location", DataType::Utf8, false),
        Field::new("Month", DataType::Int64, false),
        Field::new("Transaction Count", DataType::Int64, false),
        Field::new("CLV", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(&cols.customer)),
            Arc::new(strings(&cols.category)),
            Arc::new(strings(&cols.item)),
            Arc::new(Float64Array::from(cols.price.clone())),
            Arc::new(Int64Array::from(cols.quantity.clone())),
            Arc::new(Float64Array::from(cols.total.clone())),
            Arc::new(strings(&cols.payment)),
            Arc::new(strings(&cols.location)),
            Arc::new(Int64Array::from(cols.month.clone())),
            Arc::new(Int64Array::from(cols.transaction_count.clone())),
            Arc::new(Float64Array::from(cols.clv.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    let csv_path = "retail_store_clean_data.csv";
    let parquet_path = "retail_store_clean_data.parquet";
    write_csv(&cols, csv_path)?;
    write_parquet(&cols, parquet_path)?;

    println!(
        "Wrote {} transactions for {CUSTOMERS} customers to {csv_path} and {parquet_path}",
        cols.customer.len()
    );
    Ok(())
}
