pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{FileStore, MemoryCatalog, MemoryStore};
pub use config::AppConfig;
pub use core::StockEngine;
pub use utils::error::{Result, StockError};
