//! Platter Hardware Abstraction Layer
//!
//! This crate defines the narrow pin capability the actuation layer drives.
//! Pins are opaque handles; the capability decides what a handle means on
//! the real board (a BCM GPIO number for pigpio, a register for anything
//! else). The application never depends on a concrete driver type.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (platter-daemon)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  platter-drivers (ActuationLayer)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  platter-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pigpio daemon │       │ SimPinDriver  │
//! │  (external)   │       │ (feature sim) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pwm::PinDriver`] - Digital level, PWM duty, PWM frequency/range

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pwm;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export key types at crate root for convenience
pub use gpio::{Level, PinId};
pub use pwm::{PinDriver, PinError};
#[cfg(any(test, feature = "sim"))]
pub use sim::{PinWrite, SimPinDriver};
