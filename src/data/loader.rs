use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    RetailTable, Transaction, COL_CATEGORY, COL_CLV, COL_ITEM, COL_LOCATION, COL_MONTH,
    COL_PAYMENT_METHOD, COL_PRICE_PER_UNIT, COL_QUANTITY, COL_TOTAL_SPENT,
    COL_TRANSACTION_COUNT, REQUIRED_COLUMNS,
};

/// Path read when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "retail_store_clean_data.csv";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons the dataset cannot be loaded. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("row {row}: month {value} is not an integer within 1..=12")]
    InvalidMonth { row: usize, value: f64 },

    #[error("row {row}: column '{column}' is null")]
    NullValue { row: usize, column: &'static str },

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow conversion failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Memoized process-wide load
// ---------------------------------------------------------------------------

/// Load-once holder for the raw table. The first successful load wins and is
/// handed out forever; a failed load leaves the cache empty.
#[derive(Debug)]
pub struct DatasetCache {
    cell: OnceLock<Arc<RetailTable>>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached table, reading `path` only if nothing is cached yet.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<RetailTable>, LoadError> {
        if let Some(table) = self.cell.get() {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        log::info!(
            "Loaded {} transactions from {} ({} categories, {} payment methods)",
            table.len(),
            path.display(),
            table.categories().len(),
            table.payment_methods().len()
        );
        Ok(Arc::clone(self.cell.get_or_init(|| table)))
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The dataset shared by the whole process.
pub static SHARED_DATASET: DatasetCache = DatasetCache::new();

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transactions table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the dataset's column names
/// * `.json`    – `[{ "Category": "...", "Month": 1, ... }, ...]`
/// * `.parquet` – one column per field, any integer/float numeric type
pub fn load_file(path: &Path) -> Result<RetailTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Row decoding shared by CSV and JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Payment Method")]
    payment_method: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Item")]
    item: String,
    #[serde(rename = "Price Per Unit")]
    price_per_unit: f64,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "Total Spent")]
    total_spent: f64,
    #[serde(rename = "Transaction Count")]
    transaction_count: f64,
    #[serde(rename = "CLV")]
    clv: f64,
    /// Month arrives as `1` or `1.0` depending on the writer.
    #[serde(rename = "Month")]
    month: f64,
}

impl RawRecord {
    fn into_transaction(self, row: usize) -> Result<Transaction, LoadError> {
        Ok(Transaction {
            month: parse_month(row, self.month)?,
            category: self.category,
            payment_method: self.payment_method,
            location: self.location,
            item: self.item,
            price_per_unit: self.price_per_unit,
            quantity: self.quantity,
            total_spent: self.total_spent,
            transaction_count: self.transaction_count,
            clv: self.clv,
        })
    }
}

fn parse_month(row: usize, value: f64) -> Result<u8, LoadError> {
    if value.fract() == 0.0 && (1.0..=12.0).contains(&value) {
        Ok(value as u8)
    } else {
        Err(LoadError::InvalidMonth { row, value })
    }
}

fn check_columns(present: &[&str]) -> Result<(), LoadError> {
    for required in REQUIRED_COLUMNS {
        if !present.contains(&required) {
            return Err(LoadError::MissingColumn(required));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RetailTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    check_columns(&headers.iter().collect::<Vec<_>>())?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        rows.push(result?.into_transaction(row_no)?);
    }

    Ok(RetailTable::from_rows(rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented layout, the default `orient='records'` export:
///
/// ```json
/// [
///   { "Category": "Food", "Payment Method": "Cash", "Month": 7, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RetailTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<JsonValue> = serde_json::from_str(&text)?;

    let mut rows = Vec::with_capacity(records.len());
    for (row_no, record) in records.into_iter().enumerate() {
        if let Some(obj) = record.as_object() {
            check_columns(&obj.keys().map(String::as_str).collect::<Vec<_>>())?;
        }
        let raw: RawRecord = serde_json::from_value(record)?;
        rows.push(raw.into_transaction(row_no)?);
    }

    Ok(RetailTable::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
///
/// String columns may be Utf8 or LargeUtf8; numeric columns any integer or
/// float width. Everything is cast through Arrow before row extraction.
fn load_parquet(path: &Path) -> Result<RetailTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    // a file without row groups yields no batches, so check the schema here
    check_columns(
        &builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect::<Vec<_>>(),
    )?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = BatchColumns::locate(&batch)?;
        let offset = rows.len();
        for r in 0..batch.num_rows() {
            rows.push(columns.transaction(r, offset + r)?);
        }
    }

    Ok(RetailTable::from_rows(rows))
}

struct BatchColumns {
    category: ArrayRef,
    payment_method: ArrayRef,
    location: ArrayRef,
    item: ArrayRef,
    price_per_unit: ArrayRef,
    quantity: ArrayRef,
    total_spent: ArrayRef,
    transaction_count: ArrayRef,
    clv: ArrayRef,
    month: ArrayRef,
}

impl BatchColumns {
    fn locate(batch: &RecordBatch) -> Result<Self, LoadError> {
        let column = |name: &'static str, to: &DataType| -> Result<ArrayRef, LoadError> {
            let idx = batch
                .schema()
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            Ok(cast(batch.column(idx).as_ref(), to)?)
        };
        Ok(Self {
            category: column(COL_CATEGORY, &DataType::Utf8)?,
            payment_method: column(COL_PAYMENT_METHOD, &DataType::Utf8)?,
            location: column(COL_LOCATION, &DataType::Utf8)?,
            item: column(COL_ITEM, &DataType::Utf8)?,
            price_per_unit: column(COL_PRICE_PER_UNIT, &DataType::Float64)?,
            quantity: column(COL_QUANTITY, &DataType::Float64)?,
            total_spent: column(COL_TOTAL_SPENT, &DataType::Float64)?,
            transaction_count: column(COL_TRANSACTION_COUNT, &DataType::Float64)?,
            clv: column(COL_CLV, &DataType::Float64)?,
            month: column(COL_MONTH, &DataType::Float64)?,
        })
    }

    fn transaction(&self, r: usize, row_no: usize) -> Result<Transaction, LoadError> {
        Ok(Transaction {
            category: text(&self.category, r, row_no, COL_CATEGORY)?,
            payment_method: text(&self.payment_method, r, row_no, COL_PAYMENT_METHOD)?,
            location: text(&self.location, r, row_no, COL_LOCATION)?,
            item: text(&self.item, r, row_no, COL_ITEM)?,
            price_per_unit: number(&self.price_per_unit, r, row_no, COL_PRICE_PER_UNIT)?,
            quantity: number(&self.quantity, r, row_no, COL_QUANTITY)?,
            total_spent: number(&self.total_spent, r, row_no, COL_TOTAL_SPENT)?,
            transaction_count: number(&self.transaction_count, r, row_no, COL_TRANSACTION_COUNT)?,
            clv: number(&self.clv, r, row_no, COL_CLV)?,
            month: parse_month(row_no, number(&self.month, r, row_no, COL_MONTH)?)?,
        })
    }
}

fn text(col: &ArrayRef, r: usize, row_no: usize, column: &'static str) -> Result<String, LoadError> {
    if col.is_null(r) {
        return Err(LoadError::NullValue { row: row_no, column });
    }
    Ok(col.as_string::<i32>().value(r).to_string())
}

fn number(col: &ArrayRef, r: usize, row_no: usize, column: &'static str) -> Result<f64, LoadError> {
    if col.is_null(r) {
        return Err(LoadError::NullValue { row: row_no, column });
    }
    Ok(col.as_primitive::<Float64Type>().value(r))
}
