//! Multi-channel actuation layer
//!
//! Owns the state of every configured channel and turns commands into pin
//! writes. Writes for one command are issued in a fixed order: direction
//! level, then speed duty, then the brake output.

pub mod error;
pub mod layer;

pub use error::ActuationError;
pub use layer::ActuationLayer;
