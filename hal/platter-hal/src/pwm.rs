//! Pin capability
//!
//! The single interface between the actuation layer and the hardware:
//! set a digital level, set a PWM duty on a `0..=range` scale, and set the
//! PWM frequency/range of a pin.
//!
//! Calls are assumed non-reentrant. Callers serialize access (the actuation
//! layer keeps the driver behind a lock) so an implementation never sees two
//! concurrent writes.

use core::fmt;

use crate::gpio::{Level, PinId};

/// Errors reported by a pin driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// The backing service (pigpio daemon, sysfs, ...) is not reachable
    NotConnected,
    /// The pin handle does not exist on this board
    InvalidPin(PinId),
    /// The pin does not support PWM output
    PwmUnsupported(PinId),
    /// The write was rejected or did not complete
    WriteFailed(PinId),
    /// The capability has already been released
    Released,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::NotConnected => f.write_str("pin driver not connected"),
            PinError::InvalidPin(pin) => write!(f, "invalid pin {}", pin),
            PinError::PwmUnsupported(pin) => write!(f, "pin {} does not support PWM", pin),
            PinError::WriteFailed(pin) => write!(f, "write to {} failed", pin),
            PinError::Released => f.write_str("pin driver released"),
        }
    }
}

/// Pin-level output capability
///
/// Implementations handle the actual hardware access for one board.
pub trait PinDriver {
    /// Drive a pin to a digital level
    fn set_level(&mut self, pin: PinId, level: Level) -> Result<(), PinError>;

    /// Set the PWM duty of a pin on the `0..=range` scale
    fn set_duty(&mut self, pin: PinId, duty: u16) -> Result<(), PinError>;

    /// Set the PWM frequency of a pin in Hz
    fn set_frequency(&mut self, pin: PinId, hz: u32) -> Result<(), PinError>;

    /// Set the PWM range (full-scale duty value) of a pin
    fn set_range(&mut self, pin: PinId, range: u16) -> Result<(), PinError>;

    /// Release the capability
    ///
    /// Called once at shutdown after all outputs were driven to a safe state.
    fn release(&mut self) -> Result<(), PinError>;
}
