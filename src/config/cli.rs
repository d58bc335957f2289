use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "attr-stock")]
#[command(about = "Stock counts for shared product attribute terms")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "attr-stock.toml", global = true)]
    pub config: PathBuf,

    /// Override the stock file from the config
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Override the catalog file from the config
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the admin and storefront HTTP endpoints
    Serve {
        /// Override server.bind from the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write all attribute terms and their stock as CSV
    Export {
        /// Output file; defaults to attribute-stock-<date>.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Overwrite stock counts from a CSV export
    Import { file: PathBuf },
    /// Set (or clear, with an empty value) the stock of one term
    Set {
        term_id: String,
        #[arg(allow_hyphen_values = true)]
        stock: String,
    },
    /// Set the same stock on several terms of one attribute taxonomy
    BulkSet {
        /// Attribute taxonomy the terms belong to, e.g. pa_color
        #[arg(long)]
        taxonomy: String,
        #[arg(long, allow_hyphen_values = true)]
        stock: String,
        #[arg(required = true, value_delimiter = ',')]
        term_ids: Vec<String>,
    },
    /// Consume stock for a completed order
    CompleteOrder { order_id: String },
    /// Print terms of every attribute taxonomy with their stock
    List,
}
