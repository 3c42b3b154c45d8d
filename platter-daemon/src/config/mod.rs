//! Configuration loading and parsing
//!
//! Loads the TOML configuration from a file or the embedded defaults and
//! turns it into a validated [`PlatterConfig`](platter_core::config::PlatterConfig).

pub mod file;
pub mod loader;

pub use file::ConfigFile;
pub use loader::{load_config, parse_config, LoadError, EMBEDDED_CONFIG};
