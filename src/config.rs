use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::data::loader::DEFAULT_DATA_PATH;

/// Interactive dashboard over a retail transactions table.
#[derive(Debug, Parser, Clone)]
#[command(name = "retail-lens", version, about)]
pub struct Args {
    /// The transactions file to load (.csv, .json or .parquet). It is read once
    /// at startup.
    #[arg(long, short = 'd', env = "RETAIL_LENS_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Rank the top-selling products over the filtered rows instead of the
    /// whole dataset.
    #[arg(long, env = "RETAIL_LENS_FILTER_TOP_PRODUCTS")]
    pub filter_top_products: bool,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace. RUST_LOG directives still apply.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

/// Options the reactive pipeline needs at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub filter_top_products: bool,
}

impl From<&Args> for PipelineOptions {
    fn from(args: &Args) -> Self {
        Self {
            filter_top_products: args.filter_top_products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["retail-lens"]).unwrap();
        assert_eq!(args.data, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(!args.filter_top_products);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert_eq!(PipelineOptions::from(&args), PipelineOptions::default());
    }

    #[test]
    fn explicit_flags() {
        let args = Args::try_parse_from([
            "retail-lens",
            "--data",
            "sales.parquet",
            "--filter-top-products",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("sales.parquet"));
        assert!(PipelineOptions::from(&args).filter_top_products);
        assert_eq!(args.log_level, LevelFilter::Debug);
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
