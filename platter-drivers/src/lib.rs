//! Hardware actuation
//!
//! This crate drives the pin capability defined in platter-hal from the
//! board-agnostic channel logic in platter-core:
//!
//! - Per-channel locking so the writes of one command never interleave
//! - Safe startup into the braking state
//! - Safe stop of every channel and release of the pins on shutdown

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;

pub use actuator::{ActuationError, ActuationLayer};
