//! Brake/speed interlock
//!
//! Resolves a normalized command into the raw outputs of one channel.
//!
//! Digital brake: while the brake is applied the speed duty is forced to the
//! top of the speed window, whatever speed was requested. The mechanical
//! brake holds the platter; the drive only supplies holding torque. With the
//! brake released, speed maps linearly into the window.
//!
//! PWM brake: speed and brake map independently, no override.

use platter_hal::Level;

use super::mapping::{map_duty, UI_MAX};
use crate::config::{ActuationConfig, BrakeMode};

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Direction line low
    #[default]
    Forward,
    /// Direction line high
    Reverse,
}

impl Direction {
    /// Normalize a UI direction flag (`true`/non-zero = reverse)
    pub const fn from_flag(reverse: bool) -> Self {
        if reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Level of the direction line
    pub const fn level(self) -> Level {
        match self {
            Direction::Forward => Level::Low,
            Direction::Reverse => Level::High,
        }
    }
}

/// Normalized channel command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCommand {
    /// Speed, 0-100
    pub speed: u8,
    /// Rotation direction
    pub direction: Direction,
    /// Brake, 0-100
    pub brake: u8,
}

impl ChannelCommand {
    /// Create a command
    pub const fn new(speed: u8, direction: Direction, brake: u8) -> Self {
        Self {
            speed,
            direction,
            brake,
        }
    }

    /// Build a command from unchecked UI values, clamping into 0-100
    pub fn from_ui(speed: i32, direction: Direction, brake: i32) -> Self {
        Self {
            speed: speed.clamp(0, i32::from(UI_MAX)) as u8,
            direction,
            brake: brake.clamp(0, i32::from(UI_MAX)) as u8,
        }
    }

    /// Speed zero with full brake
    pub const fn stopped(direction: Direction) -> Self {
        Self {
            speed: 0,
            direction,
            brake: UI_MAX,
        }
    }

    /// Clamp speed and brake into 0-100
    pub fn clamped(self) -> Self {
        Self {
            speed: self.speed.min(UI_MAX),
            direction: self.direction,
            brake: self.brake.min(UI_MAX),
        }
    }
}

/// Raw brake output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeOutput {
    /// Digital brake line level
    Level(Level),
    /// PWM brake duty
    Duty(u16),
}

/// Raw outputs of one channel, in device units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawState {
    /// Direction line level
    pub direction: Level,
    /// Speed PWM duty
    pub speed_duty: u16,
    /// Brake output
    pub brake: BrakeOutput,
}

/// Conceptual channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPhase {
    /// Brake released, no speed commanded
    Stopped,
    /// Brake released and driving
    Running {
        /// Commanded direction
        direction: Direction,
        /// Applied speed duty
        duty: u16,
    },
    /// Brake engaged
    Braking,
}

/// Resolve a command into raw outputs
pub fn resolve(command: ChannelCommand, config: &ActuationConfig, range: u16) -> RawState {
    let command = command.clamped();
    let direction = command.direction.level();

    match config.brake {
        BrakeMode::Digital { active_level, .. } => {
            if config.brake.is_engaged(command.brake) {
                RawState {
                    direction,
                    speed_duty: map_duty(UI_MAX, config.speed_duty, range),
                    brake: BrakeOutput::Level(active_level),
                }
            } else {
                RawState {
                    direction,
                    speed_duty: map_duty(command.speed, config.speed_duty, range),
                    brake: BrakeOutput::Level(!active_level),
                }
            }
        }
        BrakeMode::Pwm { duty } => RawState {
            direction,
            speed_duty: map_duty(command.speed, config.speed_duty, range),
            brake: BrakeOutput::Duty(map_duty(command.brake, duty, range)),
        },
    }
}

/// Raw outputs of the safe-stop state: speed zero, brake fully engaged
///
/// The direction line is left where it is.
pub fn safe_stop(direction: Level, config: &ActuationConfig, range: u16) -> RawState {
    let brake = match config.brake {
        BrakeMode::Digital { active_level, .. } => BrakeOutput::Level(active_level),
        BrakeMode::Pwm { duty } => BrakeOutput::Duty(map_duty(UI_MAX, duty, range)),
    };

    RawState {
        direction,
        speed_duty: 0,
        brake,
    }
}

/// Phase a command puts the channel in
pub fn phase_of(command: ChannelCommand, config: &ActuationConfig, range: u16) -> ChannelPhase {
    let command = command.clamped();
    if config.brake.is_engaged(command.brake) {
        ChannelPhase::Braking
    } else if command.speed == 0 {
        ChannelPhase::Stopped
    } else {
        ChannelPhase::Running {
            direction: command.direction,
            duty: map_duty(command.speed, config.speed_duty, range),
        }
    }
}
