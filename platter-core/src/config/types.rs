//! Actuation parameter types
//!
//! These types describe how normalized UI values (0-100) become raw duty
//! values and brake levels. They are built once at startup and never
//! change afterwards.

use platter_hal::Level;

/// Default PWM frequency (Hz)
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 1000;

/// Default PWM range (8-bit control)
pub const DEFAULT_PWM_RANGE: u16 = 255;

/// Default speed duty ceiling: 70% of the 8-bit range
pub const DEFAULT_SPEED_DUTY_MAX: u16 = 178;

/// Default brake value at or above which a digital brake is applied
pub const DEFAULT_APPLY_THRESHOLD: u8 = 1;

/// Duty window: the raw duty at UI=0 and at UI=100
///
/// `min > max` is allowed and produces an inverted mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyRange {
    /// Duty at UI value 0
    pub min: u16,
    /// Duty at UI value 100
    pub max: u16,
}

impl DutyRange {
    /// Create a duty window
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Full window `0..=range`
    pub const fn full(range: u16) -> Self {
        Self { min: 0, max: range }
    }

    /// Clamp both ends into the device's valid `0..=range` duty scale
    pub fn clamped(self, range: u16) -> Self {
        Self {
            min: self.min.min(range),
            max: self.max.min(range),
        }
    }
}

/// How the brake output is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeMode {
    /// On/off brake line
    Digital {
        /// Level that means "brake applied" (driver polarity varies)
        active_level: Level,
        /// Normalized brake value at or above which the brake is applied
        apply_threshold: u8,
    },
    /// Proportional brake driven by PWM
    Pwm {
        /// Brake duty at UI=0 and UI=100
        duty: DutyRange,
    },
}

impl BrakeMode {
    /// Digital brake, active-high, applied from `apply_threshold` upwards
    pub const fn digital(apply_threshold: u8) -> Self {
        BrakeMode::Digital {
            active_level: Level::High,
            apply_threshold,
        }
    }

    /// Check if a normalized brake value counts as "engaged"
    ///
    /// For a PWM brake any non-zero value is engaged.
    pub fn is_engaged(&self, brake: u8) -> bool {
        match *self {
            BrakeMode::Digital {
                apply_threshold, ..
            } => brake >= apply_threshold,
            BrakeMode::Pwm { .. } => brake > 0,
        }
    }
}

/// Mapping parameters for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationConfig {
    /// Speed duty at UI=0 and UI=100
    pub speed_duty: DutyRange,
    /// Brake output mode and its parameters
    pub brake: BrakeMode,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            speed_duty: DutyRange::new(0, DEFAULT_SPEED_DUTY_MAX),
            brake: BrakeMode::Pwm {
                duty: DutyRange::full(DEFAULT_PWM_RANGE),
            },
        }
    }
}

/// PWM output settings shared by every channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    /// PWM frequency in Hz
    pub frequency_hz: u32,
    /// Full-scale duty value
    pub range: u16,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            range: DEFAULT_PWM_RANGE,
        }
    }
}
