//! Board-agnostic core logic for the platter controller
//!
//! This crate contains all application logic that does not depend on
//! a specific pin driver:
//!
//! - Configuration type definitions and validation
//! - Turn-based access scheduling (queue, control windows, timeouts)
//! - Duty mapping and the brake/speed interlock
//! - Per-channel actuation state machine

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod actuation;
pub mod config;
pub mod scheduler;
