//! intervue-store — Storage backends for intervue.
//!
//! Implements the `InterviewStore` trait in memory and as a JSON document on
//! disk, plus access code generation and configuration loading.

pub mod codes;
pub mod config;
pub mod file;
pub mod memory;
mod state;

pub use codes::{generate_code, normalize_code};
pub use config::{create_store, load_config, load_config_from, IntervueConfig, StoreKind};
pub use file::FileStore;
pub use memory::MemoryStore;
