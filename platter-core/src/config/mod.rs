//! Configuration types
//!
//! Board-agnostic configuration structures, built once at startup.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
