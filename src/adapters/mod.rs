// Adapters layer: concrete implementations of the domain ports.

pub mod catalog_file;
pub mod file_store;
pub mod memory;

pub use catalog_file::load_catalog;
pub use file_store::FileStore;
pub use memory::{MemoryCatalog, MemoryStore, MetaSnapshot};
