//! Turn-based access scheduling
//!
//! Grants exclusive, time-boxed control to one session at a time and
//! rotates control when the time-box runs out.

pub mod access;
pub mod queue;

pub use access::AccessScheduler;
pub use queue::{AccessQueue, ControlWindow, SessionId};
