//! Simulated pin driver
//!
//! Records every write instead of touching hardware. Used when the daemon
//! runs on a machine without a pin service, and by tests to observe the
//! exact order of writes and to inject faults.

use heapless::{FnvIndexMap, FnvIndexSet, HistoryBuffer};
use log::trace;

use crate::gpio::{Level, PinId};
use crate::pwm::{PinDriver, PinError};

/// Maximum number of distinct pins tracked
pub const MAX_PINS: usize = 32;

/// Number of writes kept in the history
pub const HISTORY_LEN: usize = 128;

/// A single recorded write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinWrite {
    /// Digital level
    Level(PinId, Level),
    /// PWM duty, in range units
    Duty(PinId, u16),
    /// PWM frequency (Hz)
    Frequency(PinId, u32),
    /// PWM range
    Range(PinId, u16),
}

impl PinWrite {
    /// Pin the write was addressed to
    pub fn pin(&self) -> PinId {
        match *self {
            PinWrite::Level(pin, _)
            | PinWrite::Duty(pin, _)
            | PinWrite::Frequency(pin, _)
            | PinWrite::Range(pin, _) => pin,
        }
    }
}

/// Last value written to each output function of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinOutput {
    /// Last digital level
    pub level: Option<Level>,
    /// Last PWM duty
    pub duty: Option<u16>,
    /// Configured PWM frequency
    pub frequency_hz: Option<u32>,
    /// Configured PWM range
    pub range: Option<u16>,
}

/// Recording pin driver
#[derive(Debug, Default)]
pub struct SimPinDriver {
    pins: FnvIndexMap<PinId, PinOutput, MAX_PINS>,
    history: HistoryBuffer<PinWrite, HISTORY_LEN>,
    failing: FnvIndexSet<PinId, MAX_PINS>,
    writes: usize,
    released: bool,
}

impl SimPinDriver {
    /// Create a driver with no pins written yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `pin` fail with [`PinError::WriteFailed`]
    pub fn fail_writes_to(&mut self, pin: PinId) {
        let _ = self.failing.insert(pin);
    }

    /// Stop injecting faults
    pub fn clear_faults(&mut self) {
        self.failing.clear();
    }

    /// Current outputs of a pin, if it was ever written
    pub fn output(&self, pin: PinId) -> Option<PinOutput> {
        self.pins.get(&pin).copied()
    }

    /// Last digital level written to a pin
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.output(pin).and_then(|o| o.level)
    }

    /// Last PWM duty written to a pin
    pub fn duty(&self, pin: PinId) -> Option<u16> {
        self.output(pin).and_then(|o| o.duty)
    }

    /// Recorded writes, oldest first (bounded to [`HISTORY_LEN`])
    pub fn history(&self) -> impl Iterator<Item = &PinWrite> + '_ {
        self.history.oldest_ordered()
    }

    /// Forget recorded writes (pin outputs are kept)
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Total number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Check if [`PinDriver::release`] was called
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn record(&mut self, write: PinWrite) -> Result<(), PinError> {
        if self.released {
            return Err(PinError::Released);
        }
        let pin = write.pin();
        if self.failing.contains(&pin) {
            return Err(PinError::WriteFailed(pin));
        }

        let mut output = self.pins.get(&pin).copied().unwrap_or_default();
        match write {
            PinWrite::Level(_, level) => output.level = Some(level),
            PinWrite::Duty(_, duty) => {
                if let Some(range) = output.range {
                    if duty > range {
                        return Err(PinError::WriteFailed(pin));
                    }
                }
                output.duty = Some(duty);
            }
            PinWrite::Frequency(_, hz) => output.frequency_hz = Some(hz),
            PinWrite::Range(_, range) => output.range = Some(range),
        }
        self.pins
            .insert(pin, output)
            .map_err(|_| PinError::InvalidPin(pin))?;

        trace!("sim write: {:?}", write);
        self.history.write(write);
        self.writes += 1;
        Ok(())
    }
}

impl PinDriver for SimPinDriver {
    fn set_level(&mut self, pin: PinId, level: Level) -> Result<(), PinError> {
        self.record(PinWrite::Level(pin, level))
    }

    fn set_duty(&mut self, pin: PinId, duty: u16) -> Result<(), PinError> {
        self.record(PinWrite::Duty(pin, duty))
    }

    fn set_frequency(&mut self, pin: PinId, hz: u32) -> Result<(), PinError> {
        self.record(PinWrite::Frequency(pin, hz))
    }

    fn set_range(&mut self, pin: PinId, range: u16) -> Result<(), PinError> {
        self.record(PinWrite::Range(pin, range))
    }

    fn release(&mut self) -> Result<(), PinError> {
        if self.released {
            return Err(PinError::Released);
        }
        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIN: PinId = PinId(18);

    #[test]
    fn test_records_outputs() {
        let mut sim = SimPinDriver::new();
        sim.set_range(PIN, 255).unwrap();
        sim.set_duty(PIN, 128).unwrap();
        sim.set_level(PinId(24), Level::High).unwrap();

        assert_eq!(sim.duty(PIN), Some(128));
        assert_eq!(sim.level(PinId(24)), Some(Level::High));
        assert_eq!(sim.level(PIN), None);
        assert_eq!(sim.write_count(), 3);
    }

    #[test]
    fn test_history_is_ordered() {
        let mut sim = SimPinDriver::new();
        sim.set_level(PinId(24), Level::Low).unwrap();
        sim.set_duty(PIN, 10).unwrap();

        let mut writes = sim.history();
        assert_eq!(writes.next(), Some(&PinWrite::Level(PinId(24), Level::Low)));
        assert_eq!(writes.next(), Some(&PinWrite::Duty(PIN, 10)));
        assert_eq!(writes.next(), None);
    }

    #[test]
    fn test_duty_above_range_rejected() {
        let mut sim = SimPinDriver::new();
        sim.set_range(PIN, 100).unwrap();
        assert_eq!(sim.set_duty(PIN, 101), Err(PinError::WriteFailed(PIN)));
        assert_eq!(sim.duty(PIN), None);
    }

    #[test]
    fn test_fault_injection() {
        let mut sim = SimPinDriver::new();
        sim.fail_writes_to(PIN);
        assert_eq!(sim.set_duty(PIN, 1), Err(PinError::WriteFailed(PIN)));
        assert!(sim.set_duty(PinId(13), 1).is_ok());

        sim.clear_faults();
        assert!(sim.set_duty(PIN, 1).is_ok());
    }

    #[test]
    fn test_writes_fail_after_release() {
        let mut sim = SimPinDriver::new();
        sim.release().unwrap();
        assert!(sim.is_released());
        assert_eq!(sim.set_level(PIN, Level::High), Err(PinError::Released));
        assert_eq!(sim.release(), Err(PinError::Released));
    }
}
