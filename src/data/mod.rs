//! Data layer.
//!
//! ```text
//!   .csv / .json / .parquet ──► loader ──► RetailTable (raw, loaded once)
//!                                              │
//!                         FilterSelection ──► filter ──► RetailTable (filtered)
//! ```
//!
//! The raw table is never mutated after load; every filter pass produces a
//! fresh table.

pub mod filter;
pub mod loader;
pub mod model;
