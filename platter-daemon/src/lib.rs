//! Platter daemon library
//!
//! The coordinator that ties the access scheduler to the actuation layer,
//! the outbound notification model, and configuration loading. The binary
//! wires these into embassy tasks.

pub mod config;
pub mod coordinator;
pub mod events;

pub use coordinator::{CommandError, Coordinator, Dispatch};
pub use events::{Event, Inbound, Notification, Recipient, Status};
